use async_trait::async_trait;
use domain::{CandidateId, JobOfferId, Result};

/// Persists and retrieves embedding vectors keyed by entity id.
#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    async fn get_candidate_embedding(&self, id: CandidateId) -> Result<Option<Vec<f32>>>;
    async fn get_job_offer_embedding(&self, id: JobOfferId) -> Result<Option<Vec<f32>>>;
    async fn save_candidate_embedding(&self, id: CandidateId, embedding: Vec<f32>) -> Result<()>;
    async fn save_job_offer_embedding(&self, id: JobOfferId, embedding: Vec<f32>) -> Result<()>;
}

/// The embedding model backend, abstracted behind a callable so the
/// subscribers crate never talks to a concrete HTTP client directly.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
