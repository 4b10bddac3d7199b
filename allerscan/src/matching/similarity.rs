//! Ratcliff/Obershelp sequence similarity.
//!
//! `ratio(a, b) = 2 * M / (|a| + |b|)` where `M` is the total length of the
//! matching blocks found by recursively taking the longest common substring
//! and repeating on the unmatched pieces to its left and right. Ties for the
//! longest block go to the earliest position in `a`, then in `b`. No junk
//! heuristics are applied.

/// Similarity of two strings in `[0.0, 1.0]`, compared by `char`.
///
/// Two empty strings are identical (`1.0`).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // run[j + 1] = length of the common suffix ending at a[i - 1], b[j]
    let mut run = vec![0usize; b.len() + 1];
    for i in alo..ahi {
        let mut next = vec![0usize; b.len() + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = run[j] + 1;
            next[j + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        run = next;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_and_disjoint() {
        assert!(approx(ratio("milk", "milk"), 1.0));
        assert!(approx(ratio("milk", "soy"), 0.0));
        assert!(approx(ratio("", ""), 1.0));
        assert!(approx(ratio("milk", ""), 0.0));
    }

    #[test]
    fn single_substitution() {
        // "pean" + "ts" = 6 matching chars over 14
        assert!(approx(ratio("peanuts", "peanvts"), 12.0 / 14.0));
    }

    #[test]
    fn prefix_word_is_not_close() {
        assert!(approx(ratio("oat", "oatmeal"), 6.0 / 10.0));
    }

    #[test]
    fn recurses_on_both_sides_of_longest_block() {
        // longest block "bcd", then "a" on the left and "f" on the right
        assert!(approx(ratio("abcdef", "axbcdyf"), 2.0 * 5.0 / 13.0));
    }

    #[test]
    fn symmetric_for_simple_cases() {
        for (a, b) in [("gluten", "glutem"), ("sesame", "sesarne"), ("egg", "eggs")] {
            assert!(approx(ratio(a, b), ratio(b, a)), "{a} vs {b}");
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert!(approx(ratio("crème", "creme"), 8.0 / 10.0));
    }
}
