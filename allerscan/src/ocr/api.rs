use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header::CONTENT_TYPE, multipart, Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use super::response::{snippet, OcrResponse};
use super::{AttemptResult, OcrStrategy};
use crate::config::{StrategyConfig, Transport};
use crate::error::{AllerscanError, Result};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Body of a Hugging Face inference call made the way the client libraries do.
#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
}

/// A remote OCR strategy reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpStrategy {
    client: Client,
    name: String,
    transport: Transport,
    endpoint: String,
    api_key: String,
    language: String,
}

/// Sniffed MIME type and file extension of an encoded image.
fn sniff(image: &[u8]) -> (&'static str, &'static str) {
    infer::get(image)
        .map(|kind| (kind.mime_type(), kind.extension()))
        .unwrap_or((FALLBACK_MIME, "bin"))
}

impl HttpStrategy {
    pub fn new(config: &StrategyConfig, language: &str, timeout: Duration) -> Result<Self> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            Some(_) => {
                return Err(AllerscanError::Configuration(format!(
                    "Credential for OCR strategy '{}' is blank",
                    config.name
                )))
            }
            None => {
                return Err(AllerscanError::Configuration(format!(
                    "Credential required for OCR strategy '{}'",
                    config.name
                )))
            }
        };

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AllerscanError::Configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            name: config.name.clone(),
            transport: config.transport,
            endpoint: config.endpoint.clone(),
            api_key,
            language: language.to_string(),
        })
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    fn build_request(&self, image: &[u8]) -> std::result::Result<RequestBuilder, String> {
        let (mime, extension) = sniff(image);
        let request = self.client.post(&self.endpoint);

        let request = match self.transport {
            Transport::JsonBase64 => request.bearer_auth(&self.api_key).json(&InferenceRequest {
                inputs: STANDARD.encode(image),
            }),
            Transport::RawBinary => request
                .bearer_auth(&self.api_key)
                .header(CONTENT_TYPE, mime)
                .body(image.to_vec()),
            Transport::Multipart => {
                let file_part = multipart::Part::bytes(image.to_vec())
                    .file_name(format!("label.{extension}"))
                    .mime_str(mime)
                    .map_err(|e| format!("invalid MIME type: {e}"))?;

                let form = multipart::Form::new()
                    .part("file", file_part)
                    .text("language", self.language.clone())
                    .text("scale", "true")
                    .text("isTable", "false")
                    .text("OCREngine", "2");

                request.header("apikey", &self.api_key).multipart(form)
            }
            Transport::FormBase64 => {
                let data_url = format!("data:{mime};base64,{}", STANDARD.encode(image));
                request.header("apikey", &self.api_key).form(&[
                    ("base64Image", data_url.as_str()),
                    ("language", self.language.as_str()),
                    ("scale", "true"),
                    ("OCREngine", "1"),
                ])
            }
        };

        Ok(request)
    }
}

#[async_trait]
impl OcrStrategy for HttpStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, image: &[u8]) -> AttemptResult {
        let request = match self.build_request(image) {
            Ok(request) => request,
            Err(reason) => return AttemptResult::SoftFailure(reason),
        };

        debug!(strategy = %self.name, transport = %self.transport, "Sending OCR request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return AttemptResult::SoftFailure("request timed out".to_string())
            }
            Err(e) => return AttemptResult::SoftFailure(format!("request failed: {e}")),
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return AttemptResult::SoftFailure(format!(
                    "HTTP {}: failed to read response body: {e}",
                    status.as_u16()
                ))
            }
        };

        debug!(
            strategy = %self.name,
            status = status.as_u16(),
            body = %snippet(&body),
            "OCR response received"
        );

        OcrResponse::decode(content_type.as_deref(), &body).into_attempt(status.as_u16())
    }
}
