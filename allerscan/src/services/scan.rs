use tracing::{info, warn};

use crate::config::{Config, ScanConfig};
use crate::error::{AllerscanError, Result};
use crate::matching::{highlight, TextIndex};
use crate::models::ScanResult;
use crate::ocr::ExtractionOrchestrator;

const MISSING_INPUT: &str = "Provide an image and at least one allergen (comma-separated).";
const ELLIPSIS: &str = "...";

#[derive(Clone, Debug)]
enum ScanBackend {
    Ready(ExtractionOrchestrator),
    Unavailable { reason: String },
}

/// Top-level scan use case: OCR, then normalize, match and highlight.
///
/// Holds only immutable configuration, so one instance serves every request.
#[derive(Clone, Debug)]
pub struct ScanService {
    backend: ScanBackend,
    config: ScanConfig,
}

/// Split a comma-separated allergen list into trimmed, lowercased terms.
///
/// Empty entries are dropped; duplicates and input order are kept.
pub fn parse_allergen_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

impl ScanService {
    pub fn new(orchestrator: ExtractionOrchestrator, config: ScanConfig) -> Self {
        Self {
            backend: ScanBackend::Ready(orchestrator),
            config,
        }
    }

    /// Build from configuration. A chain that cannot be built leaves the
    /// service running but unable to scan.
    pub fn from_config(config: &Config) -> Self {
        let backend = match ExtractionOrchestrator::from_config(&config.ocr) {
            Ok(orchestrator) => {
                info!(
                    strategies = ?orchestrator.strategy_names(),
                    timeout_secs = config.ocr.timeout_secs,
                    "OCR chain initialized"
                );
                ScanBackend::Ready(orchestrator)
            }
            Err(e) => {
                let reason = format!("OCR chain unavailable: {e}");
                warn!("{}", reason);
                ScanBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            config: config.scan.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, ScanBackend::Ready(_))
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        match &self.backend {
            ScanBackend::Ready(orchestrator) => orchestrator.strategy_names(),
            ScanBackend::Unavailable { .. } => Vec::new(),
        }
    }

    /// Scan one label image for the comma-separated `allergens`.
    ///
    /// Input is validated before any remote call. Every term is matched, in
    /// input order; the preview and its highlight spans are only computed
    /// when `want_preview` is set.
    pub async fn scan(
        &self,
        image: Option<&[u8]>,
        allergens: &str,
        want_preview: bool,
    ) -> Result<ScanResult> {
        let terms = parse_allergen_list(allergens);
        let image = match image {
            Some(bytes) if !bytes.is_empty() && !terms.is_empty() => bytes,
            _ => return Err(AllerscanError::InputValidation(MISSING_INPUT.to_string())),
        };

        let orchestrator = match &self.backend {
            ScanBackend::Ready(orchestrator) => orchestrator,
            ScanBackend::Unavailable { reason } => {
                return Err(AllerscanError::Configuration(reason.clone()))
            }
        };

        let extracted = orchestrator.extract(image).await.into_result()?;
        let index = TextIndex::from_raw(&extracted.text);

        let matches: Vec<_> = terms.iter().map(|term| index.match_term(term)).collect();

        let (text_preview, highlight_spans) = if want_preview {
            let text_preview = preview(index.text().as_str(), self.config.preview_chars);
            let highlight_terms = matches
                .iter()
                .filter(|m| m.matched)
                .flat_map(|m| std::iter::once(m.term.as_str()).chain(m.evidence.as_deref()));
            let spans = highlight(&text_preview, highlight_terms);
            (text_preview, spans)
        } else {
            (String::new(), Vec::new())
        };

        let result = ScanResult {
            matches,
            text_preview,
            highlight_spans,
        };

        info!(
            strategy = %extracted.strategy,
            terms = terms.len(),
            detected = result.detected().len(),
            "Scan completed"
        );

        Ok(result)
    }
}
