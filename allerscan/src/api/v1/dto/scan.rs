//! Scan request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::render_marked;
use crate::models;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// `multipart/form-data` body for `POST /v1/scan`. Documentation only; the
/// handler reads the fields from the multipart stream.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanForm {
    /// Photo of the ingredients label (PNG, JPEG, ...). `file` is accepted as an alias.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// Comma-separated allergen list, e.g. `"peanut, milk, soy"`.
    pub allergens: String,
    /// Include the normalized text preview with highlights. `show_text` is accepted as an alias.
    pub show_text: Option<bool>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Which matching tier produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum V1MatchVia {
    ExactToken,
    WordBoundaryRegex,
    FuzzyClosest,
    None,
}

impl From<models::MatchVia> for V1MatchVia {
    fn from(via: models::MatchVia) -> Self {
        match via {
            models::MatchVia::ExactToken => Self::ExactToken,
            models::MatchVia::WordBoundaryRegex => Self::WordBoundaryRegex,
            models::MatchVia::FuzzyClosest => Self::FuzzyClosest,
            models::MatchVia::None => Self::None,
        }
    }
}

/// Result for one requested allergen.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    /// The allergen as normalized from the request.
    pub term: String,
    pub matched: bool,
    pub matched_via: V1MatchVia,
    /// Text that produced the hit (a variant or an OCR token).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl From<models::MatchRecord> for MatchResponse {
    fn from(record: models::MatchRecord) -> Self {
        Self {
            term: record.term,
            matched: record.matched,
            matched_via: record.matched_via.into(),
            evidence: record.evidence,
        }
    }
}

/// Half-open byte range into the preview text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SpanResponse {
    pub start: usize,
    pub end: usize,
}

impl From<models::Span> for SpanResponse {
    fn from(span: models::Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

/// Normalized label text with detected allergens marked.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// First characters of the normalized OCR text.
    pub text: String,
    /// Sorted, non-overlapping highlight spans into `text`.
    pub spans: Vec<SpanResponse>,
    /// `text`, HTML-escaped, with each span wrapped in `<mark>`.
    pub markup: String,
}

/// Response for `POST /v1/scan`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    /// Identifier of this scan, for correlating logs. Nothing is stored.
    pub scan_id: String,
    pub scanned_at: DateTime<Utc>,
    /// Matched allergens in request order.
    pub detected: Vec<String>,
    /// One entry per requested allergen, in request order.
    pub matches: Vec<MatchResponse>,
    /// Present only when `showText` was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewResponse>,
}

impl ScanResponse {
    pub fn new(
        scan_id: String,
        scanned_at: DateTime<Utc>,
        result: models::ScanResult,
        include_preview: bool,
    ) -> Self {
        let detected = result.detected().into_iter().map(str::to_string).collect();
        let preview = include_preview.then(|| PreviewResponse {
            markup: render_marked(&result.text_preview, &result.highlight_spans),
            spans: result
                .highlight_spans
                .iter()
                .copied()
                .map(Into::into)
                .collect(),
            text: result.text_preview,
        });

        Self {
            scan_id,
            scanned_at,
            detected,
            matches: result.matches.into_iter().map(Into::into).collect(),
            preview,
        }
    }
}
