//! OCR (Optical Character Recognition) Module
//!
//! Obtains the text of an ingredients photo from remote OCR services.
//!
//! # Architecture
//!
//! - `OcrStrategy` trait: one way of invoking a remote OCR service
//! - `HttpStrategy`: the reqwest implementation, one per configured transport
//! - `OcrResponse`: tagged decoder for the response shapes providers return
//! - `ExtractionOrchestrator`: runs the strategies in configured order and
//!   returns the first non-empty text, or every failure reason in order
//!
//! # Configuration
//!
//! The chain is controlled via `OcrConfig` (see `config.rs`):
//! - `strategies`: ordered strategy presets with endpoint and credential
//! - `timeout_secs`: budget for each single attempt
//! - `language`: OCR language hint for providers that take one
//!
//! # Usage
//!
//! ```rust,ignore
//! let orchestrator = ExtractionOrchestrator::from_config(&config.ocr)?;
//! match orchestrator.extract(&image_bytes).await {
//!     ExtractionOutcome::Success(extracted) => println!("{}", extracted.text),
//!     ExtractionOutcome::Failure(diagnostics) => eprintln!("{diagnostics:?}"),
//! }
//! ```

mod api;
mod orchestrator;
mod response;
mod strategy;

pub use api::HttpStrategy;
pub use orchestrator::{Diagnostic, ExtractedText, ExtractionOrchestrator, ExtractionOutcome};
pub use response::OcrResponse;
pub use strategy::{AttemptResult, OcrStrategy};
