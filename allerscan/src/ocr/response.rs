use serde::Deserialize;
use serde_json::Value;

use super::AttemptResult;

/// Longest provider body excerpt kept in a diagnostic.
const SNIPPET_CHARS: usize = 240;

/// A provider response reduced to the four shapes the chain cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum OcrResponse {
    /// Extracted text, possibly empty.
    Text(String),
    /// The hosted model is still loading.
    Warming { estimated_time: Option<f64> },
    /// The provider reported an error.
    ApiError(String),
    /// Non-JSON or unknown JSON; holds a flattened, truncated excerpt.
    Unrecognized(String),
}

/// OCR.space `parse/image` response.
#[derive(Debug, Deserialize)]
struct OcrSpaceResponse {
    #[serde(rename = "IsErroredOnProcessing")]
    is_errored: bool,
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Option<Vec<OcrSpaceParsed>>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<Value>,
    #[serde(rename = "ErrorMessageDetails", default)]
    error_details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrSpaceParsed {
    #[serde(rename = "ParsedText", default)]
    parsed_text: Option<String>,
}

/// Hugging Face image-to-text output entry.
#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Hugging Face cold-start response.
#[derive(Debug, Deserialize)]
struct LoadingResponse {
    error: String,
    estimated_time: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Value,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

/// Every JSON shape the decoder understands. Order matters: the first
/// variant that deserializes wins.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResponse {
    OcrSpace(OcrSpaceResponse),
    GeneratedList(Vec<GeneratedText>),
    Generated(GeneratedText),
    Loading(LoadingResponse),
    Error(ErrorResponse),
    Text(TextResponse),
    Bare(String),
}

impl From<WireResponse> for OcrResponse {
    fn from(wire: WireResponse) -> Self {
        match wire {
            WireResponse::OcrSpace(resp) if resp.is_errored => {
                OcrResponse::ApiError(ocrspace_error(resp.error_message, resp.error_details))
            }
            WireResponse::OcrSpace(resp) => {
                let text = resp
                    .parsed_results
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|r| r.parsed_text)
                    .filter(|t| !t.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                OcrResponse::Text(text.trim().to_string())
            }
            WireResponse::GeneratedList(items) => OcrResponse::Text(
                items
                    .into_iter()
                    .map(|g| g.generated_text)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            WireResponse::Generated(g) => OcrResponse::Text(g.generated_text),
            WireResponse::Loading(l) => {
                if is_loading_message(&l.error) {
                    OcrResponse::Warming {
                        estimated_time: Some(l.estimated_time),
                    }
                } else {
                    OcrResponse::ApiError(l.error)
                }
            }
            WireResponse::Error(e) => match e.error {
                Value::String(msg) if is_loading_message(&msg) => OcrResponse::Warming {
                    estimated_time: None,
                },
                Value::String(msg) => OcrResponse::ApiError(msg),
                Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                    Some(msg) => OcrResponse::ApiError(msg.to_string()),
                    None => OcrResponse::ApiError(Value::Object(map).to_string()),
                },
                other => OcrResponse::ApiError(other.to_string()),
            },
            WireResponse::Text(t) => OcrResponse::Text(t.text),
            WireResponse::Bare(text) => OcrResponse::Text(text),
        }
    }
}

fn is_loading_message(msg: &str) -> bool {
    msg.to_lowercase().contains("loading")
}

/// OCR.space reports `ErrorMessage` as either a string or a list of strings.
fn ocrspace_error(message: Option<Value>, details: Option<String>) -> String {
    let message = match message {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Array(items)) => items
            .into_iter()
            .find_map(|v| v.as_str().map(str::to_string)),
        _ => None,
    };

    message
        .or(details.filter(|d| !d.trim().is_empty()))
        .unwrap_or_else(|| "Unknown OCR error".to_string())
}

fn is_plain_text(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_lowercase().starts_with("text/plain"))
}

/// Whitespace-flattened prefix of `body`, at most [`SNIPPET_CHARS`] characters.
pub(crate) fn snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "<empty body>".to_string();
    }
    flat.chars().take(SNIPPET_CHARS).collect()
}

impl OcrResponse {
    /// Decode a response body. `content_type` is the raw `Content-Type` header.
    pub fn decode(content_type: Option<&str>, body: &str) -> Self {
        if let Ok(wire) = serde_json::from_str::<WireResponse>(body) {
            return wire.into();
        }
        if is_plain_text(content_type) {
            return OcrResponse::Text(body.to_string());
        }
        OcrResponse::Unrecognized(snippet(body))
    }

    /// Short reason for a response that did not yield text.
    pub fn reason(&self) -> String {
        match self {
            OcrResponse::Text(text) => snippet(text),
            OcrResponse::Warming {
                estimated_time: Some(secs),
            } => format!("model is warming up (estimated {secs:.0}s)"),
            OcrResponse::Warming {
                estimated_time: None,
            } => "model is warming up".to_string(),
            OcrResponse::ApiError(msg) => format!("API error: {}", snippet(msg)),
            OcrResponse::Unrecognized(excerpt) => format!("unrecognized response: {excerpt}"),
        }
    }

    /// Turn the decoded body plus its HTTP status into an attempt result.
    pub fn into_attempt(self, status: u16) -> AttemptResult {
        let success = (200..300).contains(&status);
        match self {
            OcrResponse::Text(text) if success => AttemptResult::Success(text),
            warming @ OcrResponse::Warming { .. } => AttemptResult::SoftFailure(warming.reason()),
            other if success => AttemptResult::SoftFailure(other.reason()),
            other => AttemptResult::SoftFailure(format!("HTTP {status}: {}", other.reason())),
        }
    }
}
