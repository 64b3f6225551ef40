use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use domain::{CandidateId, JobOfferId};
use ports::{CandidateReader, EmbeddingModel, EmbeddingRepository, JobOfferReader};

const MAX_ATTEMPTS: usize = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);
const FIRST_JOBS: usize = 5;

fn backoff() -> ExponentialBuilder {
    ExponentialBuilder::default().with_jitter().with_min_delay(BASE_DELAY).with_max_times(MAX_ATTEMPTS)
}

/// Builds the text embedded for a candidate: name, skills, and the titles
/// of their first five prior jobs.
fn candidate_embedding_text(candidate: &domain::Candidate) -> String {
    let jobs = candidate
        .jobs
        .iter()
        .take(FIRST_JOBS)
        .map(|job| format!("{} at {}", job.title, job.organization))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} | skills: {} | jobs: {}", candidate.full_name, candidate.skills.join(", "), jobs)
}

/// Handles `JobOfferApplied` by embedding the candidate's profile. Retries
/// up to three times with exponential backoff; on exhaustion, logs a
/// dead-letter record with the event payload instead of propagating.
pub async fn generate_candidate_embeddings(
    candidate_id: CandidateId,
    candidates: &dyn CandidateReader,
    model: &dyn EmbeddingModel,
    repo: &dyn EmbeddingRepository,
) {
    let result = (|| async {
        let candidate = candidates
            .get_candidate(candidate_id)
            .await?
            .ok_or_else(|| domain::ScreeningError::NotFound("candidate not found".into()))?;
        let embedding = model.embed(&candidate_embedding_text(&candidate)).await?;
        repo.save_candidate_embedding(candidate_id, embedding).await
    })
    .retry(backoff())
    .notify(|err, dur| {
        tracing::warn!(error = %err, retry_delay_ms = dur.as_millis(), "retrying_candidate_embedding");
    })
    .await;

    if let Err(error) = result {
        tracing::error!(
            candidate_id = %candidate_id,
            error = %error,
            "candidate_embedding_dead_letter"
        );
    }
}

fn job_offer_embedding_text(job_offer: &domain::JobOffer) -> String {
    format!(
        "{} | strengths: {} | responsibilities: {}",
        job_offer.objective,
        job_offer.strengths.join(", "),
        job_offer.responsibilities.join(", ")
    )
}

/// Symmetric to `generate_candidate_embeddings`, for the job offer side.
pub async fn generate_job_offer_embeddings(
    job_offer_id: JobOfferId,
    job_offers: &dyn JobOfferReader,
    model: &dyn EmbeddingModel,
    repo: &dyn EmbeddingRepository,
) {
    let result = (|| async {
        let job_offer = job_offers
            .get_job_offer(job_offer_id)
            .await?
            .ok_or_else(|| domain::ScreeningError::NotFound("job offer not found".into()))?;
        let embedding = model.embed(&job_offer_embedding_text(&job_offer)).await?;
        repo.save_job_offer_embedding(job_offer_id, embedding).await
    })
    .retry(backoff())
    .notify(|err, dur| {
        tracing::warn!(error = %err, retry_delay_ms = dur.as_millis(), "retrying_job_offer_embedding");
    })
    .await;

    if let Err(error) = result {
        tracing::error!(
            job_offer_id = %job_offer_id,
            error = %error,
            "job_offer_embedding_dead_letter"
        );
    }
}
