use std::collections::HashSet;

use super::NormalizedText;

/// Split normalized text into maximal runs of ASCII lowercase letters.
///
/// Digits, punctuation, whitespace and non-ASCII letters all act as separators.
pub fn tokenize(text: &NormalizedText) -> Vec<String> {
    text.as_str()
        .split(|c: char| !c.is_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Membership view over the tokens of one text.
#[derive(Debug, Clone, Default)]
pub struct TokenSet(HashSet<String>);

impl TokenSet {
    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = &'a String>>(iter: I) -> Self {
        Self(iter.into_iter().cloned().collect())
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
