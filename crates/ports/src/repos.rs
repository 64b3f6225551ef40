use async_trait::async_trait;
use domain::{
    ApplicationId, CallId, CandidateId, JobOfferId, Result, ScreeningAnalysis,
    ScreeningApplication, ScreeningCall, TranscriptSegment,
};
use domain::{Candidate, JobOffer};

/// Narrow read capability, not a god repository. A context wires the
/// concrete adapter (in-memory or Postgres) that implements whichever of
/// these a given service actually needs.
#[async_trait]
pub trait CandidateReader: Send + Sync {
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>>;
}

#[async_trait]
pub trait CandidateWriter: Send + Sync {
    async fn save_candidate(&self, candidate: &Candidate) -> Result<()>;
}

#[async_trait]
pub trait JobOfferReader: Send + Sync {
    async fn get_job_offer(&self, id: JobOfferId) -> Result<Option<JobOffer>>;
}

#[async_trait]
pub trait JobOfferWriter: Send + Sync {
    async fn save_job_offer(&self, job_offer: &JobOffer) -> Result<()>;
}

#[async_trait]
pub trait ApplicationReader: Send + Sync {
    async fn get_application(&self, id: ApplicationId) -> Result<Option<ScreeningApplication>>;

    async fn find_by_username_and_job_offer(
        &self,
        username: &str,
        job_offer_id: &str,
    ) -> Result<Option<ScreeningApplication>>;
}

#[async_trait]
pub trait ApplicationWriter: Send + Sync {
    /// Atomically persists candidate, job offer, and application together so
    /// a failure partway through never leaves one without the others.
    async fn save_application_graph(
        &self,
        candidate: &Candidate,
        job_offer: &JobOffer,
        application: &ScreeningApplication,
    ) -> Result<()>;
}

#[async_trait]
pub trait CallReader: Send + Sync {
    async fn get_call(&self, id: CallId) -> Result<Option<ScreeningCall>>;
}

#[async_trait]
pub trait CallWriter: Send + Sync {
    async fn save_call(&self, call: &ScreeningCall) -> Result<()>;

    async fn update_call_transcript(
        &self,
        call_id: CallId,
        transcript: &[TranscriptSegment],
    ) -> Result<()>;

    async fn mark_call_completed(&self, call_id: CallId) -> Result<()>;
}

#[async_trait]
pub trait AnalysisReader: Send + Sync {
    async fn get_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ScreeningAnalysis>>;
}

#[async_trait]
pub trait AnalysisWriter: Send + Sync {
    /// Upserts by application id: at most one row per application.
    async fn upsert_by_application(&self, analysis: &ScreeningAnalysis) -> Result<()>;
}
