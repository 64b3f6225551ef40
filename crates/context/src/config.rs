use std::time::Duration;

use dialog::DialogEnv;
use models::ModelsEnv;
use upstream::UpstreamEnv;

/// Everything the composition root needs to pick concrete adapters: which
/// storage backend, which event bus backend, and the HTTP edges for
/// upstream lookups and model backends. `database_url`/`broker_url` absent
/// means the in-memory adapter for that concern — used for local runs and
/// integration tests, never the default for a real deployment.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub database_url: Option<String>,
    pub broker_url: Option<String>,
    pub outbox_flush_interval_seconds: u64,
    pub upstream: UpstreamEnv,
    pub models: ModelsEnv,
    pub dialog: DialogEnv,
}

impl ContextConfig {
    pub fn outbox_flush_interval(&self) -> Duration {
        Duration::from_secs(self.outbox_flush_interval_seconds)
    }
}
