//! Lexical allergen matching.
//!
//! A term is matched against one OCR text in three tiers (exact token,
//! boundary-delimited literal, closest token by sequence similarity), and the
//! matched terms can then be highlighted as non-overlapping spans.

mod highlight;
mod matcher;
mod similarity;

pub use highlight::{highlight, render_bracketed, render_marked};
pub use matcher::{match_term, TextIndex, FUZZY_CUTOFF};
pub use similarity::ratio;
