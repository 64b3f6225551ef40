const SIMILARITY_THRESHOLD: f64 = 0.82;
const SUBSTRING_LENGTH_RATIO: f64 = 0.88;
const SUBSTRING_MIN_LEN: usize = 30;

fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim().to_string()
}

/// True when `candidate_text` is likely an echo of `last_emma_text`: exact
/// match after normalization, near-duplicate by similarity ratio, or one
/// contains the other with a close enough length ratio once both are long
/// enough for containment to be meaningful.
pub fn is_echo(candidate_text: &str, last_emma_text: &str) -> bool {
    if last_emma_text.is_empty() {
        return false;
    }

    let a = normalize(candidate_text);
    let b = normalize(last_emma_text);

    if a.is_empty() || b.is_empty() {
        return false;
    }

    if a == b {
        return true;
    }

    if strsim::normalized_levenshtein(&a, &b) >= SIMILARITY_THRESHOLD {
        return true;
    }

    if a.len() >= SUBSTRING_MIN_LEN && b.len() >= SUBSTRING_MIN_LEN && (a.contains(&b) || b.contains(&a)) {
        let ratio = a.len().min(b.len()) as f64 / a.len().max(b.len()) as f64;
        if ratio >= SUBSTRING_LENGTH_RATIO {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_after_normalization_is_echo() {
        assert!(is_echo("Ready when you are.", "ready when you are"));
    }

    #[test]
    fn punctuation_and_case_differences_are_echo() {
        assert!(is_echo(
            "Hello!! Thanks for Joining, I'm EMMA.",
            "hello thanks for joining im emma"
        ));
    }

    #[test]
    fn unrelated_text_is_not_echo() {
        assert!(!is_echo("I have five years of Python experience", "What interests you about this role?"));
    }

    #[test]
    fn empty_last_emma_text_never_echoes() {
        assert!(!is_echo("anything", ""));
    }

    #[test]
    fn is_symmetric_under_normalization() {
        let a = "I really enjoy building reliable distributed systems at scale";
        let b = "i really enjoy building reliable distributed systems at scale!";
        assert_eq!(is_echo(a, b), is_echo(b, a));
    }

    #[test]
    fn is_idempotent() {
        let a = "Ready when you are.";
        let b = "ready when you are";
        let first = is_echo(a, b);
        let second = is_echo(a, b);
        assert_eq!(first, second);
    }

    #[quickcheck_macros::quickcheck]
    fn prop_symmetric(a: String, b: String) -> bool {
        is_echo(&a, &b) == is_echo(&b, &a)
    }
}
