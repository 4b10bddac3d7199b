use std::fmt;

use serde::Serialize;

/// OCR text with every whitespace run collapsed to one ASCII space,
/// no leading or trailing whitespace, and lowercase letters only.
///
/// Only [`normalize`] constructs it, so the invariant holds for every value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize raw extracted text.
///
/// Idempotent: `normalize(normalize(x).as_str()) == normalize(x)`.
pub fn normalize(raw: &str) -> NormalizedText {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NormalizedText(collapsed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newlines_tabs_and_runs() {
        let text = normalize("  INGREDIENTS:\n\tWheat  Flour,\r\n\nMilk  ");
        assert_eq!(text.as_str(), "ingredients: wheat flour, milk");
    }

    #[test]
    fn empty_and_blank_inputs_become_empty() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \n\t \r ").is_empty());
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "",
            "   ",
            "Contains: MILK, Soy\nand  TREE-NUTS",
            "Crème Brûlée\u{00a0}\u{2003}Œufs",
            "already normalized text",
        ];

        for input in inputs {
            let once = normalize(input);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn unicode_whitespace_is_collapsed() {
        let text = normalize("milk\u{00a0}\u{2003}powder");
        assert_eq!(text.as_str(), "milk powder");
    }

    #[test]
    fn no_double_spaces_or_edges() {
        let text = normalize("\n a \n\n b \t c \n");
        assert!(!text.as_str().contains("  "));
        assert!(!text.as_str().starts_with(' '));
        assert!(!text.as_str().ends_with(' '));
    }
}
