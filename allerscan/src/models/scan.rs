use serde::{Deserialize, Serialize};

/// Which matching tier produced a hit. Diagnostic only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchVia {
    ExactToken,
    WordBoundaryRegex,
    FuzzyClosest,
    None,
}

impl std::fmt::Display for MatchVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactToken => write!(f, "exact_token"),
            Self::WordBoundaryRegex => write!(f, "word_boundary_regex"),
            Self::FuzzyClosest => write!(f, "fuzzy_closest"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of matching one allergen term against one text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub term: String,
    pub matched: bool,
    pub matched_via: MatchVia,
    /// The variant or OCR token that produced the hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl MatchRecord {
    pub fn hit(term: impl Into<String>, via: MatchVia, evidence: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            matched: true,
            matched_via: via,
            evidence: Some(evidence.into()),
        }
    }

    pub fn miss(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            matched: false,
            matched_via: MatchVia::None,
            evidence: None,
        }
    }
}

/// Half-open byte range `[start, end)` into a preview string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Everything one scan produces. Built once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanResult {
    /// One record per supplied term, in the order the user listed them.
    pub matches: Vec<MatchRecord>,
    /// Possibly truncated normalized text; empty unless a preview was requested.
    pub text_preview: String,
    /// Sorted, non-overlapping spans into `text_preview`.
    pub highlight_spans: Vec<Span>,
}

impl ScanResult {
    /// Matched terms in input order. Duplicated input terms appear twice.
    pub fn detected(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| m.matched)
            .map(|m| m.term.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_via_serializes_snake_case() {
        let json = serde_json::to_value(MatchVia::WordBoundaryRegex).unwrap();
        assert_eq!(json, "word_boundary_regex");
        assert_eq!(MatchVia::FuzzyClosest.to_string(), "fuzzy_closest");
    }

    #[test]
    fn miss_has_no_evidence() {
        let record = MatchRecord::miss("almond");
        assert!(!record.matched);
        assert_eq!(record.matched_via, MatchVia::None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("evidence").is_none());
    }

    #[test]
    fn span_overlap_is_half_open() {
        assert!(!Span::new(0, 6).overlaps(&Span::new(6, 10)));
        assert!(Span::new(0, 7).overlaps(&Span::new(6, 10)));
        assert!(Span::new(2, 3).overlaps(&Span::new(0, 10)));
    }

    #[test]
    fn detected_keeps_order_and_duplicates() {
        let result = ScanResult {
            matches: vec![
                MatchRecord::hit("soy", MatchVia::ExactToken, "soy"),
                MatchRecord::miss("milk"),
                MatchRecord::hit("soy", MatchVia::ExactToken, "soy"),
            ],
            text_preview: String::new(),
            highlight_spans: vec![],
        };
        assert_eq!(result.detected(), vec!["soy", "soy"]);
    }
}
