//! Allergen label scanner.
//!
//! Reads the text of an ingredients photo through a fallback chain of remote
//! OCR services, then matches a user's allergen list against it, tolerating
//! plurals, hyphenation, spacing and single-character OCR typos.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod ocr;
pub mod services;
pub mod text;
