use async_trait::async_trait;
use domain::Result;

/// The chat model backend used to answer out-of-band role questions during
/// an interview, abstracted behind a callable per the system prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}
