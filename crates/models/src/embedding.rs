use async_trait::async_trait;
use domain::{Result, ScreeningError};
use ports::EmbeddingModel;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP client for an embedding model backend. One attempt per call — retry
/// policy belongs to the caller, which already wraps this in backoff.
pub struct HttpEmbeddingModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpEmbeddingModel {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url: base_url.into(), model: model.into() }
    }
}

#[async_trait]
impl EmbeddingModel for HttpEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { model: &self.model, input: text })
            .send()
            .await
            .map_err(|e| ScreeningError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScreeningError::Transient(format!("embedding model returned {}", response.status())));
        }

        let body: EmbedResponse =
            response.json().await.map_err(|e| ScreeningError::Transient(e.to_string()))?;
        Ok(body.embedding)
    }
}
