use async_trait::async_trait;
use domain::{Result, ScreeningError};
use ports::ChatModel;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    system: &'a str,
    user: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    text: String,
}

/// HTTP client for the chat model backend that answers out-of-band role
/// questions during an interview.
pub struct HttpChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl HttpChatModel {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url: base_url.into(), model: model.into() }
    }
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { model: &self.model, system, user })
            .send()
            .await
            .map_err(|e| ScreeningError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScreeningError::Transient(format!("chat model returned {}", response.status())));
        }

        let body: ChatResponse =
            response.json().await.map_err(|e| ScreeningError::Transient(e.to_string()))?;
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn generates_a_reply_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "Sure, happy to answer that.",
            })))
            .mount(&server)
            .await;

        let model = HttpChatModel::new(server.uri(), "test-model", std::time::Duration::from_secs(2));
        let reply = model.generate("You are Emma.", "What's the team like?").await.unwrap();
        assert_eq!(reply, "Sure, happy to answer that.");
    }
}
