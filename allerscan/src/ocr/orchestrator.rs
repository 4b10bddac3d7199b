use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{AttemptResult, HttpStrategy, OcrStrategy};
use crate::config::OcrConfig;
use crate::error::{AllerscanError, Result};

/// Why one strategy did not produce text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub strategy: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Text produced by the first strategy that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    /// Name of the strategy that produced `text`.
    pub strategy: String,
    /// Failures of the strategies tried before it, in attempt order.
    pub soft_failures: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(ExtractedText),
    /// Every strategy failed; one diagnostic per strategy, in attempt order.
    Failure(Vec<Diagnostic>),
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<ExtractedText> {
        match self {
            Self::Success(extracted) => Ok(extracted),
            Self::Failure(diagnostics) => Err(AllerscanError::Extraction { diagnostics }),
        }
    }
}

enum State {
    NotStarted,
    TryingStrategy(usize),
    Succeeded { strategy: usize, text: String },
    ExhaustedFailed,
}

/// Runs OCR strategies in order until one returns non-empty text.
///
/// Strategies are never raced and each is attempted at most once per call.
/// Nothing is remembered between calls.
#[derive(Clone)]
pub struct ExtractionOrchestrator {
    strategies: Vec<Arc<dyn OcrStrategy>>,
    attempt_timeout: Duration,
}

impl fmt::Debug for ExtractionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionOrchestrator")
            .field("strategies", &self.strategy_names())
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl ExtractionOrchestrator {
    pub fn new(strategies: Vec<Arc<dyn OcrStrategy>>, attempt_timeout: Duration) -> Result<Self> {
        if strategies.is_empty() {
            return Err(AllerscanError::Configuration(
                "No OCR strategies configured".to_string(),
            ));
        }

        Ok(Self {
            strategies,
            attempt_timeout,
        })
    }

    /// Build the HTTP strategy chain. Strategies without a credential are skipped.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let timeout = config.attempt_timeout();
        let mut strategies: Vec<Arc<dyn OcrStrategy>> = Vec::new();

        for strategy in &config.strategies {
            if strategy.api_key.is_none() {
                warn!(
                    strategy = %strategy.name,
                    "No credential configured for OCR strategy, skipping"
                );
                continue;
            }

            let http = HttpStrategy::new(strategy, &config.language, timeout)?;
            info!(
                strategy = %strategy.name,
                transport = %http.transport(),
                endpoint = %strategy.endpoint,
                "OCR strategy enabled"
            );
            strategies.push(Arc::new(http));
        }

        Self::new(strategies, timeout)
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    async fn run_attempt(&self, strategy: &dyn OcrStrategy, image: &[u8]) -> AttemptResult {
        match tokio::time::timeout(self.attempt_timeout, strategy.attempt(image)).await {
            Ok(AttemptResult::Success(text)) if text.trim().is_empty() => {
                AttemptResult::SoftFailure("returned empty text".to_string())
            }
            Ok(result) => result,
            Err(_) => {
                AttemptResult::SoftFailure(format!("timed out after {:?}", self.attempt_timeout))
            }
        }
    }

    /// Extract text from `image`, trying each strategy in configured order.
    pub async fn extract(&self, image: &[u8]) -> ExtractionOutcome {
        let mut diagnostics = Vec::new();
        let mut state = State::NotStarted;

        loop {
            state = match state {
                State::NotStarted => State::TryingStrategy(0),
                State::TryingStrategy(index) => {
                    let strategy = self.strategies[index].as_ref();
                    let started = Instant::now();
                    let result = self.run_attempt(strategy, image).await;
                    let elapsed_ms = started.elapsed().as_millis() as u64;

                    match result {
                        AttemptResult::Success(text) => {
                            debug!(
                                strategy = strategy.name(),
                                attempt = index,
                                elapsed_ms,
                                "OCR strategy succeeded"
                            );
                            State::Succeeded {
                                strategy: index,
                                text,
                            }
                        }
                        AttemptResult::SoftFailure(reason) => {
                            warn!(
                                strategy = strategy.name(),
                                attempt = index,
                                elapsed_ms,
                                reason = %reason,
                                "OCR strategy failed"
                            );
                            diagnostics.push(Diagnostic::new(strategy.name(), reason));

                            if index + 1 < self.strategies.len() {
                                State::TryingStrategy(index + 1)
                            } else {
                                State::ExhaustedFailed
                            }
                        }
                    }
                }
                State::Succeeded { strategy, text } => {
                    let name = self.strategies[strategy].name().to_string();
                    info!(
                        strategy = %name,
                        soft_failures = diagnostics.len(),
                        chars = text.chars().count(),
                        "Text extracted"
                    );
                    return ExtractionOutcome::Success(ExtractedText {
                        text,
                        strategy: name,
                        soft_failures: diagnostics,
                    });
                }
                State::ExhaustedFailed => {
                    warn!(attempts = diagnostics.len(), "All OCR strategies failed");
                    return ExtractionOutcome::Failure(diagnostics);
                }
            };
        }
    }
}
