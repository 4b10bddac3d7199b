use thiserror::Error;

use crate::ocr::Diagnostic;

#[derive(Error, Debug)]
pub enum AllerscanError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    InputValidation(String),

    #[error(
        "Extraction failed after {} attempt(s): {}",
        .diagnostics.len(),
        join_diagnostics(.diagnostics)
    )]
    Extraction { diagnostics: Vec<Diagnostic> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AllerscanError {
    /// Short message that is safe to show an end user.
    ///
    /// Never contains response bodies or credentials; the full diagnostic
    /// trail is only available through `Display` for logging.
    pub fn user_message(&self) -> String {
        match self {
            AllerscanError::InputValidation(msg) => msg.clone(),
            AllerscanError::Configuration(_) => {
                "Text extraction is not configured on this server.".to_string()
            }
            AllerscanError::Extraction { diagnostics } => format!(
                "Could not read text from the image ({} OCR attempt(s) failed). \
                 Try a sharper, well-lit photo of the label.",
                diagnostics.len()
            ),
            AllerscanError::Json(_) | AllerscanError::Io(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Per-strategy failure reasons, in attempt order, when extraction was exhausted.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            AllerscanError::Extraction { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, AllerscanError>;
