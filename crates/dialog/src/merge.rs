fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn is_prefix_ci(needle: &[char], haystack: &[char]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    needle
        .iter()
        .zip(haystack.iter())
        .all(|(&n, &h)| lower_char(n) == lower_char(h))
}

/// Longest `k` such that the last `k` chars of `a` case-insensitively equal
/// the first `k` chars of `b`. Tried from largest to smallest so repeated
/// merges against the same continuation converge (see `merge` idempotency).
fn overlap_len(a: &[char], b: &[char]) -> usize {
    let max_k = a.len().min(b.len());
    for k in (1..=max_k).rev() {
        let a_suffix = &a[a.len() - k..];
        let b_prefix = &b[..k];
        if a_suffix
            .iter()
            .zip(b_prefix.iter())
            .all(|(&x, &y)| lower_char(x) == lower_char(y))
        {
            return k;
        }
    }
    0
}

/// Merges a continuation fragment `b` into the pending fragment `a`.
///
/// Prefers, in order: prefix containment (one fragment already subsumes the
/// other) then longest suffix/prefix overlap, falling back to a
/// space-joined concatenation. The overlapping region in the output always
/// uses `b`'s casing, matching a client that re-sends a fragment with
/// corrected capitalization.
pub fn merge_fragments(a: &str, b: &str) -> String {
    if a.is_empty() {
        return b.to_string();
    }
    if b.is_empty() {
        return a.to_string();
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if is_prefix_ci(&a_chars, &b_chars) {
        return b.to_string();
    }
    if is_prefix_ci(&b_chars, &a_chars) {
        return a.to_string();
    }

    let k = overlap_len(&a_chars, &b_chars);
    if k > 0 {
        let prefix: String = a_chars[..a_chars.len() - k].iter().collect();
        return format!("{prefix}{b}");
    }

    format!("{a} {b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_unrelated_fragments_with_space() {
        assert_eq!(merge_fragments("I have", "five years"), "I have five years");
    }

    #[test]
    fn prefix_subsumption_returns_longer_fragment() {
        assert_eq!(merge_fragments("I have", "I have five years"), "I have five years");
    }

    #[test]
    fn reverse_prefix_subsumption_keeps_first_fragment() {
        assert_eq!(merge_fragments("I have five years", "I have"), "I have five years");
    }

    #[test]
    fn overlapping_suffix_prefix_merges_without_duplication() {
        assert_eq!(
            merge_fragments("I have five ye", "years of Python"),
            "I have five years of Python"
        );
    }

    #[test]
    fn is_idempotent_against_the_same_continuation() {
        let merged = merge_fragments("I have five ye", "years of Python");
        assert_eq!(merge_fragments(&merged, "years of Python"), merged);
    }

    #[quickcheck_macros::quickcheck]
    fn prop_idempotent(a: String, b: String) -> bool {
        let merged = merge_fragments(&a, &b);
        merge_fragments(&merged, &b) == merged
    }

    #[quickcheck_macros::quickcheck]
    fn prop_prefix_subsumes(b: String) -> bool {
        if b.is_empty() {
            return true;
        }
        let a: String = b.chars().take(b.chars().count() / 2).collect();
        merge_fragments(&a, &b) == b
    }
}
