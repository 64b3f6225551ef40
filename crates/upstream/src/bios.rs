use async_trait::async_trait;
use domain::{PriorJob, Result, ScreeningError, UpstreamFailureKind};
use ports::{BiosPort, CandidateProfile};
use serde::Deserialize;

use crate::{retrying, transport_error};

#[derive(Deserialize)]
struct BioResponse {
    username: String,
    full_name: String,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    jobs: Vec<PriorJobResponse>,
}

#[derive(Deserialize)]
struct PriorJobResponse {
    title: String,
    organization: String,
}

/// HTTP client for the external bios lookup service. Retries transport
/// failures with exponential backoff; a 404 is a successful "not found"
/// lookup, any other non-2xx or an unparseable body is an upstream failure
/// with the kind the HTTP boundary needs to pick the right status code.
pub struct HttpBiosPort {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl HttpBiosPort {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration, max_retries: usize) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url: base_url.into(), max_retries }
    }
}

#[async_trait]
impl BiosPort for HttpBiosPort {
    async fn get_bio(&self, username: &str) -> Result<Option<CandidateProfile>> {
        let url = format!("{}/bios/{}", self.base_url.trim_end_matches('/'), username);

        let response = retrying(self.max_retries, || {
            let url = url.clone();
            async move { self.client.get(&url).send().await.map_err(transport_error) }
        })
        .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if response.status().is_server_error() {
            return Err(ScreeningError::UpstreamFailure(
                UpstreamFailureKind::ServerError,
                format!("bios lookup returned {}", response.status()),
            ));
        }
        if !response.status().is_success() {
            return Err(ScreeningError::UpstreamFailure(
                UpstreamFailureKind::UnusableResponse,
                format!("bios lookup returned {}", response.status()),
            ));
        }

        let body: BioResponse = response.json().await.map_err(|e| {
            ScreeningError::UpstreamFailure(UpstreamFailureKind::UnusableResponse, e.to_string())
        })?;

        Ok(Some(CandidateProfile {
            username: body.username,
            full_name: body.full_name,
            skills: body.skills,
            jobs: body.jobs.into_iter().map(|j| PriorJob { title: j.title, organization: j.organization }).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn found_bio_maps_to_a_candidate_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bios/johndoe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "johndoe",
                "full_name": "John Doe",
                "skills": ["Rust"],
                "jobs": [{"title": "Engineer", "organization": "Acme"}],
            })))
            .mount(&server)
            .await;

        let port = HttpBiosPort::new(server.uri(), std::time::Duration::from_secs(2), 1);
        let bio = port.get_bio("johndoe").await.unwrap().unwrap();
        assert_eq!(bio.username, "johndoe");
        assert_eq!(bio.skills, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn missing_bio_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bios/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let port = HttpBiosPort::new(server.uri(), std::time::Duration::from_secs(2), 1);
        assert!(port.get_bio("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_maps_to_bad_gateway_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bios/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let port = HttpBiosPort::new(server.uri(), std::time::Duration::from_secs(2), 1);
        let err = port.get_bio("flaky").await.unwrap_err();
        assert!(matches!(err, ScreeningError::UpstreamFailure(UpstreamFailureKind::ServerError, _)));
    }
}
