use std::time::Duration;

use serde::Deserialize;

fn default_embedding_timeout_secs() -> u64 {
    5
}
fn default_chat_timeout_secs() -> u64 {
    20
}
fn default_transcriber_timeout_secs() -> u64 {
    10
}

/// Embedding/chat/transcriber model backend configuration, loaded via
/// `envy` alongside the rest of `Env`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsEnv {
    pub embedding_base_url: String,
    pub embedding_model: String,
    #[serde(default = "default_embedding_timeout_secs")]
    pub embedding_timeout_secs: u64,

    pub chat_base_url: String,
    pub chat_model: String,
    #[serde(default = "default_chat_timeout_secs")]
    pub chat_timeout_secs: u64,

    pub transcriber_base_url: String,
    #[serde(default = "default_transcriber_timeout_secs")]
    pub transcriber_timeout_secs: u64,
}

impl ModelsEnv {
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn transcriber_timeout(&self) -> Duration {
        Duration::from_secs(self.transcriber_timeout_secs)
    }
}
