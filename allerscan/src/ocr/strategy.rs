use async_trait::async_trait;

/// Outcome of a single strategy attempt.
///
/// There is no hard-stop variant: a failed attempt always lets the chain
/// move on to the next strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Success(String),
    SoftFailure(String),
}

/// One configured method of invoking OCR over the network.
#[async_trait]
pub trait OcrStrategy: Send + Sync {
    /// Stable name used in diagnostics and logs.
    fn name(&self) -> &str;

    /// Run OCR once. Must not retry internally; the caller bounds it with a timeout.
    async fn attempt(&self, image: &[u8]) -> AttemptResult;
}
