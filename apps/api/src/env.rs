use std::path::Path;
use std::sync::OnceLock;

use dialog::DialogEnv;
use models::ModelsEnv;
use serde::{Deserialize, Deserializer};
use upstream::UpstreamEnv;

fn default_port() -> u16 {
    3001
}

fn default_outbox_flush_interval_secs() -> u64 {
    5
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn filter_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

fn comma_separated<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(match raw {
        Some(s) if !s.is_empty() => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => default_cors_allowed_origins(),
    })
}

/// The full configuration surface, assembled from each crate's own `Env`
/// fragment via `#[serde(flatten)]` plus the fields that only make sense at
/// the binary level (bind port, storage/broker backends, CORS).
#[derive(Debug, Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "filter_empty")]
    pub database_url: Option<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub broker_url: Option<String>,
    #[serde(default = "default_outbox_flush_interval_secs")]
    pub outbox_flush_interval_seconds: u64,
    #[serde(default = "default_cors_allowed_origins", deserialize_with = "comma_separated")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default, deserialize_with = "filter_empty")]
    pub sentry_dsn: Option<String>,

    #[serde(flatten)]
    pub upstream: UpstreamEnv,
    #[serde(flatten)]
    pub models: ModelsEnv,
    #[serde(flatten)]
    pub dialog: DialogEnv,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_path(manifest_dir.join(".env"));
        envy::from_env().expect("failed to load environment")
    })
}
