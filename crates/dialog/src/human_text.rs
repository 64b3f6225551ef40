const MIN_LEN: usize = 2;
const MIN_ALNUM_RATIO: f64 = 0.25;

/// Rejects transcriber output that's too short, has no letters/digits at
/// all, or reads as mostly binary noise (a low alphanumeric ratio, or a
/// stray NUL byte).
pub fn is_human_text(text: &str) -> bool {
    if text.chars().any(|c| c == '\0') {
        return false;
    }

    let total = text.chars().count();
    if total < MIN_LEN {
        return false;
    }

    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    if alnum == 0 {
        return false;
    }

    (alnum as f64 / total as f64) >= MIN_ALNUM_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_short() {
        assert!(!is_human_text("a"));
    }

    #[test]
    fn rejects_nul_bytes() {
        assert!(!is_human_text("hello\0world"));
    }

    #[test]
    fn rejects_mostly_punctuation() {
        assert!(!is_human_text("!!!!!!!!!!!!a"));
    }

    #[test]
    fn accepts_ordinary_sentence() {
        assert!(is_human_text("I have five years of Python experience"));
    }
}
