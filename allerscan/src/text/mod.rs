//! Text canonicalization for OCR output.
//!
//! Everything in here is pure and total: no function fails, allocates state
//! across calls, or depends on configuration.
//!
//! - [`normalize`] collapses whitespace and case-folds raw OCR text
//! - [`variants`] expands an allergen term into mechanical spelling variants
//! - [`tokenize`] splits normalized text into `[a-z]+` words

mod normalize;
mod tokenize;
mod variants;

pub use normalize::{normalize, NormalizedText};
pub use tokenize::{tokenize, TokenSet};
pub use variants::{variants, VariantSet};
