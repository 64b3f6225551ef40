use async_trait::async_trait;
use domain::{Result, ScreeningError, UpstreamFailureKind};
use ports::{JobOfferListing, OpportunitiesPort};
use serde::Deserialize;

use crate::{retrying, transport_error};

#[derive(Deserialize)]
struct OpportunityResponse {
    external_id: String,
    objective: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    responsibilities: Vec<String>,
}

/// HTTP client for the external opportunities lookup service, symmetric to
/// `HttpBiosPort`.
pub struct HttpOpportunitiesPort {
    client: reqwest::Client,
    base_url: String,
    max_retries: usize,
}

impl HttpOpportunitiesPort {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration, max_retries: usize) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().expect("reqwest client");
        Self { client, base_url: base_url.into(), max_retries }
    }
}

#[async_trait]
impl OpportunitiesPort for HttpOpportunitiesPort {
    async fn get_opportunity(&self, job_offer_id: &str) -> Result<Option<JobOfferListing>> {
        let url = format!("{}/opportunities/{}", self.base_url.trim_end_matches('/'), job_offer_id);

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
                format!("opportunities lookup returned {}", response.status()),
            ));
        }
        if !response.status().is_success() {
            return Err(ScreeningError::UpstreamFailure(
                UpstreamFailureKind::UnusableResponse,
                format!("opportunities lookup returned {}", response.status()),
            ));
        }

        let body: OpportunityResponse = response.json().await.map_err(|e| {
            ScreeningError::UpstreamFailure(UpstreamFailureKind::UnusableResponse, e.to_string())
        })?;

        Ok(Some(JobOfferListing {
            external_id: body.external_id,
            objective: body.objective,
            strengths: body.strengths,
            responsibilities: body.responsibilities,
        }))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn found_opportunity_maps_to_a_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/opportunities/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "external_id": "job-1",
                "objective": "Build things",
                "strengths": ["Rust"],
                "responsibilities": [],
            })))
            .mount(&server)
            .await;

        let port = HttpOpportunitiesPort::new(server.uri(), std::time::Duration::from_secs(2), 1);
        let listing = port.get_opportunity("job-1").await.unwrap().unwrap();
        assert_eq!(listing.external_id, "job-1");
    }

    #[tokio::test]
    async fn missing_opportunity_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/opportunities/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let port = HttpOpportunitiesPort::new(server.uri(), std::time::Duration::from_secs(2), 1);
        assert!(port.get_opportunity("missing").await.unwrap().is_none());
    }
}
