use std::sync::Arc;

use async_trait::async_trait;
use domain::Result;
use ports::ChatModel;

const GREETING: &str = "Hello! Thanks for joining. I'm Emma. I'll ask you a few questions about your experience. Ready when you are.";
const GOODBYE: &str = "That's all from my side. Thanks for your time. Goodbye!";

/// Emma's four scripted turn kinds. Greeting and goodbye are fixed text;
/// the next question comes straight from the prepared list; only an
/// out-of-band role question needs a live model call.
#[async_trait]
pub trait Interviewer: Send + Sync {
    async fn greeting(&self, role_context: &str) -> Result<String>;

    async fn next_question(
        &self,
        question_index: usize,
        prepared_questions: &[String],
        role_context: &str,
    ) -> Result<Option<String>>;

    async fn answer_role_question(&self, question: &str, role_context: &str) -> Result<String>;

    async fn goodbye(&self) -> Result<String>;
}

/// Default interviewer: static greeting/goodbye, prepared questions served
/// in order, and role questions answered via the chat model port (a
/// truncated paraphrase of the role context when no model is configured).
pub struct EmmaInterviewer {
    chat_model: Option<Arc<dyn ChatModel>>,
}

impl EmmaInterviewer {
    pub fn new(chat_model: Option<Arc<dyn ChatModel>>) -> Self {
        Self { chat_model }
    }
}

#[async_trait]
impl Interviewer for EmmaInterviewer {
    async fn greeting(&self, _role_context: &str) -> Result<String> {
        Ok(GREETING.to_string())
    }

    async fn next_question(
        &self,
        question_index: usize,
        prepared_questions: &[String],
        _role_context: &str,
    ) -> Result<Option<String>> {
        Ok(prepared_questions.get(question_index).cloned())
    }

    async fn answer_role_question(&self, question: &str, role_context: &str) -> Result<String> {
        match &self.chat_model {
            Some(model) => {
                let system = format!(
                    "Answer only using this role context. Do not invent information.\n\n{role_context}"
                );
                model.generate(&system, question).await
            }
            None => {
                let truncated: String = role_context.chars().take(200).collect();
                Ok(format!("Based on the role: {truncated}..."))
            }
        }
    }

    async fn goodbye(&self) -> Result<String> {
        Ok(GOODBYE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_question_returns_none_past_the_end() {
        let interviewer = EmmaInterviewer::new(None);
        let questions = vec!["Q1".to_string()];
        assert_eq!(
            interviewer.next_question(1, &questions, "ctx").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn falls_back_to_truncated_role_context_without_a_chat_model() {
        let interviewer = EmmaInterviewer::new(None);
        let answer = interviewer
            .answer_role_question("What does the team do?", "We build backend systems.")
            .await
            .unwrap();
        assert!(answer.starts_with("Based on the role:"));
    }
}
