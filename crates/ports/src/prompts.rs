use async_trait::async_trait;
use domain::ApplicationId;

/// The prepared interview prompt for one application: scene-setting context
/// plus the ordered list of questions Emma will ask.
#[derive(Debug, Clone)]
pub struct CallPrompt {
    pub role_context: String,
    pub prepared_questions: Vec<String>,
}

impl CallPrompt {
    /// The prompt used when prompt generation exhausted its retries —
    /// generic enough that the call can still proceed.
    pub fn minimal_default() -> Self {
        Self {
            role_context: "This is a screening interview for an open role.".to_string(),
            prepared_questions: vec![
                "Tell me about your relevant experience.".to_string(),
                "What interests you about this role?".to_string(),
                "Do you have any questions for me?".to_string(),
            ],
        }
    }
}

/// In-memory per-application prompt storage populated by the
/// `generate_call_prompt` subscriber and read by the call service.
#[async_trait]
pub trait PromptRegistry: Send + Sync {
    async fn get_prompt(&self, application_id: ApplicationId) -> Option<CallPrompt>;
    async fn set_prompt(&self, application_id: ApplicationId, prompt: CallPrompt);
}
