use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use domain::{Result, ScreeningError};
use ports::Transcriber;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct TranscribeRequest {
    codec: String,
    sample_rate_hz: u32,
    audio_b64: String,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

/// HTTP client for the speech-to-text backend used to transcribe one
/// accumulated audio turn.
pub struct HttpTranscriber {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTranscriber {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url: base_url.into() }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, chunks: &[Vec<u8>], codec: &str, sample_rate_hz: u32) -> Result<String> {
        let audio: Vec<u8> = chunks.iter().flatten().copied().collect();
        let url = format!("{}/transcribe", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&TranscribeRequest {
                codec: codec.to_string(),
                sample_rate_hz,
                audio_b64: BASE64.encode(audio),
            })
            .send()
            .await
            .map_err(|e| ScreeningError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScreeningError::Transient(format!("transcriber returned {}", response.status())));
        }

        let body: TranscribeResponse =
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
    async fn transcribes_accumulated_audio_via_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "hello there",
            })))
            .mount(&server)
            .await;

        let transcriber = HttpTranscriber::new(server.uri(), std::time::Duration::from_secs(2));
        let text = transcriber.transcribe(&[vec![1, 2, 3]], "pcm16", 16000).await.unwrap();
        assert_eq!(text, "hello there");
    }
}
