use std::collections::BTreeSet;

/// Mechanical spelling variants of one allergen term.
///
/// Always contains the trimmed, lowercased term itself. Derived variants that
/// would be empty are never added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    term: String,
    derived: BTreeSet<String>,
}

impl VariantSet {
    /// The trimmed, lowercased term the set was derived from.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// All variants, the term itself first, then derived forms in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.term.as_str()).chain(self.derived.iter().map(String::as_str))
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.term == candidate || self.derived.contains(candidate)
    }

    pub fn len(&self) -> usize {
        1 + self.derived.len()
    }

    /// Never true; a variant set always holds its term.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Expand `term` into plural/singular, hyphen and spacing variants.
///
/// The rules are applied independently to the original term and unioned:
/// strip a trailing "es", strip a trailing "s", hyphens to spaces, spaces removed.
pub fn variants(term: &str) -> VariantSet {
    let term = term.trim().to_lowercase();
    let mut derived = BTreeSet::new();

    let mut add = |candidate: &str| {
        if !candidate.is_empty() && candidate != term {
            derived.insert(candidate.to_string());
        }
    };

    if let Some(stem) = term.strip_suffix("es") {
        add(stem);
    }
    if let Some(stem) = term.strip_suffix('s') {
        add(stem);
    }
    add(&term.replace('-', " "));
    add(&term.replace(' ', ""));

    VariantSet { term, derived }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(set: &VariantSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn always_contains_trimmed_lowercased_term() {
        for term in ["Milk", "  peanuts ", "TREE-NUTS", "soy milk", "s", ""] {
            let set = variants(term);
            let expected = term.trim().to_lowercase();
            assert!(set.contains(&expected), "{term:?} missing itself");
            assert_eq!(set.term(), expected);
        }
    }

    #[test]
    fn plural_es_adds_both_stems() {
        let set = variants("tomatoes");
        assert_eq!(collect(&set), vec!["tomatoes", "tomato", "tomatoe"]);
    }

    #[test]
    fn plural_s_is_stripped() {
        let set = variants("peanuts");
        assert!(set.contains("peanut"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn hyphen_and_space_transforms() {
        let set = variants("tree-nuts");
        assert!(set.contains("tree nuts"));
        assert!(set.contains("tree-nut"));

        let set = variants("soy milk");
        assert!(set.contains("soymilk"));
    }

    #[test]
    fn singular_term_has_only_itself() {
        let set = variants("milk");
        assert_eq!(collect(&set), vec!["milk"]);
    }

    #[test]
    fn never_adds_empty_variant() {
        let set = variants("s");
        assert_eq!(collect(&set), vec!["s"]);

        let set = variants("es");
        assert_eq!(collect(&set), vec!["es", "e"]);
    }
}
