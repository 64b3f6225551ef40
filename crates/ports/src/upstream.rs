use async_trait::async_trait;
use domain::{PriorJob, ScreeningError};

/// Candidate profile as returned by the external bios lookup service.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub username: String,
    pub full_name: String,
    pub skills: Vec<String>,
    pub jobs: Vec<PriorJob>,
}

/// Job listing as returned by the external opportunities lookup service.
#[derive(Debug, Clone)]
pub struct JobOfferListing {
    pub external_id: String,
    pub objective: String,
    pub strengths: Vec<String>,
    pub responsibilities: Vec<String>,
}

#[async_trait]
pub trait BiosPort: Send + Sync {
    /// `Ok(None)` means the lookup succeeded but found nothing; any other
    /// failure (transport, unusable payload) is an `Err`.
    async fn get_bio(&self, username: &str) -> Result<Option<CandidateProfile>, ScreeningError>;
}

#[async_trait]
pub trait OpportunitiesPort: Send + Sync {
    async fn get_opportunity(
        &self,
        job_offer_id: &str,
    ) -> Result<Option<JobOfferListing>, ScreeningError>;
}
