const ROLE_KEYWORDS: &[&str] = &[
    "role",
    "job",
    "responsibilit",
    "team",
    "stack",
    "expectation",
    "position",
    "company",
];

const INTERROGATIVE_OPENERS: &[&str] = &[
    "what", "how", "why", "when", "where", "which", "can you", "could you", "would you", "is the",
    "are the",
];

/// A role question is a candidate utterance directed back at Emma about the
/// job itself, which triggers an out-of-band answer before the dialog
/// advances to the next prepared question.
pub fn is_role_question(text: &str) -> bool {
    let lower = text.to_lowercase();

    let has_keyword = ROLE_KEYWORDS.iter().any(|kw| lower.contains(kw));
    if !has_keyword {
        return false;
    }

    lower.contains('?') || INTERROGATIVE_OPENERS.iter().any(|opener| lower.starts_with(opener))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_question_mark_with_keyword() {
        assert!(is_role_question("What does the role involve?"));
    }

    #[test]
    fn detects_interrogative_opener_without_question_mark() {
        assert!(is_role_question("Can you tell me about the team structure"));
    }

    #[test]
    fn rejects_keyword_without_interrogative_form() {
        assert!(!is_role_question("I worked on a great team before"));
    }

    #[test]
    fn rejects_question_without_role_keyword() {
        assert!(!is_role_question("What time is it?"));
    }
}
