use std::time::Duration;

use serde::Deserialize;

use crate::engine::DialogConfig;

fn default_ready_base_secs() -> u64 {
    5
}
fn default_ready_max_secs() -> u64 {
    20
}
fn default_answer_secs() -> u64 {
    45
}
fn default_silence_retries() -> u32 {
    2
}
fn default_fragment_continuation_ms() -> u64 {
    2200
}

/// The dialog timeout knobs from the configuration surface, loaded via
/// `envy` alongside the rest of `Env` and converted into a `DialogConfig`
/// the engine actually runs with.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DialogEnv {
    #[serde(default = "default_ready_base_secs")]
    pub dialog_ready_base_secs: u64,
    #[serde(default = "default_ready_max_secs")]
    pub dialog_ready_max_secs: u64,
    #[serde(default = "default_answer_secs")]
    pub dialog_answer_secs: u64,
    #[serde(default = "default_silence_retries")]
    pub dialog_silence_retries: u32,
    #[serde(default = "default_fragment_continuation_ms")]
    pub dialog_fragment_continuation_ms: u64,
}

impl Default for DialogEnv {
    fn default() -> Self {
        Self {
            dialog_ready_base_secs: default_ready_base_secs(),
            dialog_ready_max_secs: default_ready_max_secs(),
            dialog_answer_secs: default_answer_secs(),
            dialog_silence_retries: default_silence_retries(),
            dialog_fragment_continuation_ms: default_fragment_continuation_ms(),
        }
    }
}

impl From<DialogEnv> for DialogConfig {
    fn from(env: DialogEnv) -> Self {
        Self {
            ready_base: Duration::from_secs(env.dialog_ready_base_secs),
            ready_max: Duration::from_secs(env.dialog_ready_max_secs),
            answer: Duration::from_secs(env.dialog_answer_secs),
            silence_retries: env.dialog_silence_retries,
            fragment_continuation: Duration::from_millis(env.dialog_fragment_continuation_ms),
        }
    }
}
