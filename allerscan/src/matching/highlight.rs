use std::collections::BTreeSet;

use regex::RegexBuilder;
use tracing::debug;

use crate::models::Span;

/// Collect non-overlapping highlight spans for `terms` inside `text`.
///
/// Longer terms claim their occurrences first, so "milk" is never marked
/// inside an already-marked "buttermilk". Matching is case-insensitive.
/// The result is sorted by start offset.
pub fn highlight<I, S>(text: &str, terms: I) -> Vec<Span>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: BTreeSet<String> = terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut ordered: Vec<&String> = unique.iter().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut claimed: Vec<Span> = Vec::new();
    for term in ordered {
        let pattern = match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re,
            Err(e) => {
                debug!(term = %term, error = %e, "Skipping highlight term");
                continue;
            }
        };

        let mut from = 0;
        while from <= text.len() {
            let Some(found) = pattern.find_at(text, from) else {
                break;
            };
            let span = Span::new(found.start(), found.end());
            if span.is_empty() {
                break;
            }

            if claimed.iter().any(|c| c.overlaps(&span)) {
                from = next_char_boundary(text, found.start());
            } else {
                claimed.push(span);
                from = found.end();
            }
        }
    }

    claimed.sort();
    claimed
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

/// Render `text` as HTML with every span wrapped in `<mark>`.
///
/// Spans must be sorted and non-overlapping, as returned by [`highlight`].
pub fn render_marked(text: &str, spans: &[Span]) -> String {
    render(text, spans, "<mark>", "</mark>", escape_html)
}

/// Render `text` for a terminal, wrapping every span in `[` `]`.
pub fn render_bracketed(text: &str, spans: &[Span]) -> String {
    render(text, spans, "[", "]", str::to_string)
}

fn render(
    text: &str,
    spans: &[Span],
    open: &str,
    close: &str,
    escape: impl Fn(&str) -> String,
) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    let mut cursor = 0;

    for span in spans {
        let (Some(before), Some(marked)) = (
            text.get(cursor..span.start),
            text.get(span.start..span.end),
        ) else {
            continue;
        };
        out.push_str(&escape(before));
        out.push_str(open);
        out.push_str(&escape(marked));
        out.push_str(close);
        cursor = span.end;
    }

    out.push_str(&escape(text.get(cursor..).unwrap_or_default()));
    out
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(spans: &[Span]) {
        for pair in spans.windows(2) {
            assert!(pair[0].start <= pair[1].start, "unsorted: {spans:?}");
            assert!(!pair[0].overlaps(&pair[1]), "overlap: {spans:?}");
        }
    }

    #[test]
    fn butter_and_milk_do_not_overlap() {
        let text = "buttermilk and milk";
        let spans = highlight(text, ["milk", "butter"]);

        assert_well_formed(&spans);
        assert_eq!(
            spans,
            vec![Span::new(0, 6), Span::new(6, 10), Span::new(15, 19)]
        );
    }

    #[test]
    fn longer_term_claims_first() {
        let text = "buttermilk and milk";
        let spans = highlight(text, ["milk", "buttermilk"]);

        assert_eq!(spans, vec![Span::new(0, 10), Span::new(15, 19)]);
    }

    #[test]
    fn case_insensitive() {
        let spans = highlight("Contains MILK, Milk powder", ["milk"]);
        assert_eq!(spans, vec![Span::new(9, 13), Span::new(15, 19)]);
    }

    #[test]
    fn blocked_occurrence_does_not_stop_the_scan() {
        // "nana" claims 2..6; "ana" at 1..4 and 3..6 overlaps it, 7..10 does not
        let spans = highlight("banana ana", ["nana", "ana"]);
        assert_well_formed(&spans);
        assert_eq!(spans, vec![Span::new(2, 6), Span::new(7, 10)]);
    }

    #[test]
    fn no_terms_no_spans() {
        let none: [&str; 0] = [];
        assert!(highlight("contains milk", none).is_empty());
        assert!(highlight("contains milk", ["", "  "]).is_empty());
        assert!(highlight("", ["milk"]).is_empty());
    }

    #[test]
    fn duplicate_terms_are_highlighted_once() {
        let spans = highlight("soy and soy", ["soy", "soy"]);
        assert_eq!(spans, vec![Span::new(0, 3), Span::new(8, 11)]);
    }

    #[test]
    fn multibyte_text_keeps_char_boundaries() {
        let text = "crème, milk";
        let spans = highlight(text, ["milk"]);
        assert_eq!(&text[spans[0].start..spans[0].end], "milk");
    }

    #[test]
    fn renders_marks_and_escapes() {
        let text = "milk <b> & soy";
        let spans = highlight(text, ["milk", "soy"]);
        assert_eq!(
            render_marked(text, &spans),
            "<mark>milk</mark> &lt;b&gt; &amp; <mark>soy</mark>"
        );
        assert_eq!(render_bracketed(text, &spans), "[milk] <b> & [soy]");
    }

    #[test]
    fn render_without_spans_is_escaped_text() {
        assert_eq!(render_marked("a<b", &[]), "a&lt;b");
    }
}
