use regex::Regex;
use tracing::debug;

use super::similarity::ratio;
use crate::models::{MatchRecord, MatchVia};
use crate::text::{normalize, tokenize, variants, NormalizedText, TokenSet, VariantSet};

/// Minimum similarity for the fuzzy tier, compared at two-decimal precision:
/// ratios from 0.855 up to 0.86 also pass, so 12/14 ("peanvts" vs "peanuts") is a hit.
pub const FUZZY_CUTOFF: f64 = 0.86;

/// A normalized text with its token sequence and token set, built once and
/// shared by every term matched against it.
#[derive(Debug, Clone)]
pub struct TextIndex {
    text: NormalizedText,
    tokens: Vec<String>,
    token_set: TokenSet,
}

impl TextIndex {
    pub fn new(text: NormalizedText) -> Self {
        let tokens = tokenize(&text);
        let token_set = tokens.iter().collect();
        Self {
            text,
            tokens,
            token_set,
        }
    }

    /// Normalize `raw` and index it.
    pub fn from_raw(raw: &str) -> Self {
        Self::new(normalize(raw))
    }

    pub fn text(&self) -> &NormalizedText {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn token_set(&self) -> &TokenSet {
        &self.token_set
    }

    pub fn match_term(&self, term: &str) -> MatchRecord {
        match_term(term, &self.text, &self.token_set, &self.tokens)
    }
}

/// Decide whether `term` occurs in the text.
///
/// Tiers run in order and the first hit wins: whole-token equality of any
/// variant, then any variant as a boundary-delimited literal, then the
/// closest token by sequence similarity. `term` must be non-empty after
/// trimming; callers filter blank terms out.
pub fn match_term(
    term: &str,
    text: &NormalizedText,
    token_set: &TokenSet,
    tokens: &[String],
) -> MatchRecord {
    let set = variants(term);
    let term = set.term().to_string();

    if let Some(variant) = exact_token(&set, token_set) {
        return MatchRecord::hit(term, MatchVia::ExactToken, variant);
    }
    if let Some(variant) = word_boundary(&set, text) {
        return MatchRecord::hit(term, MatchVia::WordBoundaryRegex, variant);
    }
    if let Some(token) = fuzzy_closest(&term, tokens) {
        return MatchRecord::hit(term, MatchVia::FuzzyClosest, token);
    }

    MatchRecord::miss(term)
}

fn exact_token(set: &VariantSet, token_set: &TokenSet) -> Option<String> {
    set.iter()
        .filter(|v| !v.is_empty())
        .find(|v| token_set.contains(v))
        .map(str::to_string)
}

fn word_boundary(set: &VariantSet, text: &NormalizedText) -> Option<String> {
    set.iter()
        .filter(|v| !v.is_empty())
        .find(|v| match boundary_pattern(v) {
            Ok(re) => re.is_match(text.as_str()),
            Err(e) => {
                debug!(variant = %v, error = %e, "Skipping variant with unusable pattern");
                false
            }
        })
        .map(str::to_string)
}

fn boundary_pattern(literal: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "(?:^|[^a-z]){}(?:[^a-z]|$)",
        regex::escape(literal)
    ))
}

/// Closest token by ratio. Equal scores go to the lexically greatest token,
/// so the pick does not depend on where the tokens sit in the text.
fn fuzzy_closest(term: &str, tokens: &[String]) -> Option<String> {
    if term.is_empty() {
        return None;
    }

    let mut best: Option<(&String, f64)> = None;
    for token in tokens.iter().filter(|t| !t.is_empty()) {
        let score = ratio(term, token);
        let better = match best {
            None => true,
            Some((top_token, top)) => score > top || (score == top && token > top_token),
        };
        if better {
            best = Some((token, score));
        }
    }

    best.filter(|(_, score)| meets_cutoff(*score))
        .map(|(token, _)| token.clone())
}

fn meets_cutoff(score: f64) -> bool {
    (score * 100.0).round() >= (FUZZY_CUTOFF * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str, term: &str) -> MatchRecord {
        TextIndex::from_raw(text).match_term(term)
    }

    #[test]
    fn exact_token_hit() {
        let record = check("contains milk and soy", "milk");
        assert!(record.matched);
        assert_eq!(record.matched_via, MatchVia::ExactToken);
        assert_eq!(record.evidence.as_deref(), Some("milk"));
    }

    #[test]
    fn absent_term_misses() {
        let record = check("contains milk and soy", "almond");
        assert!(!record.matched);
        assert_eq!(record.matched_via, MatchVia::None);
    }

    #[test]
    fn plural_term_matches_singular_token() {
        let record = check("may contain peanut", "peanuts");
        assert_eq!(record.matched_via, MatchVia::ExactToken);
        assert_eq!(record.evidence.as_deref(), Some("peanut"));
    }

    #[test]
    fn singular_term_matches_plural_text() {
        let record = check("contains peanuts", "peanut");
        assert!(record.matched);
    }

    #[test]
    fn substring_is_not_a_match() {
        let record = check("contains oatmeal", "oat");
        assert!(!record.matched);
    }

    #[test]
    fn ocr_typo_matches_fuzzily() {
        let record = check("contains peanvts", "peanuts");
        assert!(record.matched);
        assert_eq!(record.matched_via, MatchVia::FuzzyClosest);
        assert_eq!(record.evidence.as_deref(), Some("peanvts"));
    }

    #[test]
    fn hyphenated_term_matches_spaced_phrase() {
        let record = check("Contains: TREE NUT oils", "tree-nut");
        assert_eq!(record.matched_via, MatchVia::WordBoundaryRegex);
        assert_eq!(record.evidence.as_deref(), Some("tree nut"));
    }

    #[test]
    fn hyphenated_term_matches_literal_hyphen() {
        let record = check("made with tree-nut oils", "tree-nut");
        assert_eq!(record.matched_via, MatchVia::WordBoundaryRegex);
        assert_eq!(record.evidence.as_deref(), Some("tree-nut"));
    }

    #[test]
    fn phrase_inside_longer_words_does_not_match_by_boundary() {
        let record = check("pastree nuts", "tree nut");
        assert_ne!(record.matched_via, MatchVia::WordBoundaryRegex);
        assert!(!record.matched);
    }

    #[test]
    fn spaced_term_matches_concatenated_token() {
        let record = check("ingredients: soymilk, sugar", "soy milk");
        assert_eq!(record.matched_via, MatchVia::ExactToken);
        assert_eq!(record.evidence.as_deref(), Some("soymilk"));
    }

    #[test]
    fn fuzzy_picks_first_best_token() {
        let tokens = vec!["glutem".to_string(), "gluten".to_string()];
        let text = normalize("glutem gluten");
        let set: TokenSet = tokens.iter().collect();
        let record = match_term("glutens", &text, &set, &tokens);
        // "gluten" is an exact variant, so the exact tier wins before fuzzy
        assert_eq!(record.matched_via, MatchVia::ExactToken);

        assert_eq!(
            fuzzy_closest("sesame", &["sesarne".into(), "sesame".into()]),
            Some("sesame".to_string())
        );
        assert_eq!(
            fuzzy_closest("mustard", &["mustand".into(), "mustarb".into()]),
            Some("mustand".to_string())
        );
    }

    #[test]
    fn empty_text_never_matches() {
        let record = check("", "milk");
        assert!(!record.matched);
        assert_eq!(fuzzy_closest("", &["milk".into()]), None);
    }

    #[test]
    fn cutoff_boundary() {
        assert!(meets_cutoff(12.0 / 14.0));
        assert!(meets_cutoff(0.86));
        assert!(!meets_cutoff(10.0 / 12.0));
        assert!(!meets_cutoff(0.6));
    }

    #[test]
    fn cutoff_rejects_ratios_that_round_below_it() {
        assert!(meets_cutoff(0.8551));
        assert!(!meets_cutoff(0.8549));
        assert!(!meets_cutoff(0.85));
    }

    #[test]
    fn fuzzy_tie_prefers_lexically_greatest_token() {
        // "peanvts" and "peanxts" both score 12/14 against "peanuts".
        assert_eq!(
            fuzzy_closest("peanuts", &["peanvts".to_string(), "peanxts".to_string()]),
            Some("peanxts".to_string())
        );
        assert_eq!(
            fuzzy_closest("peanuts", &["peanxts".to_string(), "peanvts".to_string()]),
            Some("peanxts".to_string())
        );
    }

}
