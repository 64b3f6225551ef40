use std::time::Duration;

use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    5
}
fn default_retries() -> usize {
    3
}

/// Upstream bios/opportunities lookup configuration, loaded via `envy`
/// alongside the rest of `Env`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamEnv {
    pub bios_base_url: String,
    pub opportunities_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub upstream_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub upstream_retries: usize,
}

impl UpstreamEnv {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
