use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use domain::{ApplicationId, ScreeningError};
use ports::{ApplicationReader, CallPrompt, CandidateReader, JobOfferReader, PromptRegistry};

const MAX_ATTEMPTS: usize = 3;
const BASE_DELAY: Duration = Duration::from_millis(500);
const FIRST_FEW: usize = 5;
const SKILLS_IN_QUESTION: usize = 3;

fn backoff() -> ExponentialBuilder {
    ExponentialBuilder::default().with_jitter().with_min_delay(BASE_DELAY).with_max_times(MAX_ATTEMPTS)
}

fn build_prompt(job_offer: &domain::JobOffer, candidate: &domain::Candidate) -> CallPrompt {
    let strengths = job_offer.strengths.iter().take(FIRST_FEW).cloned().collect::<Vec<_>>().join(", ");
    let responsibilities =
        job_offer.responsibilities.iter().take(FIRST_FEW).cloned().collect::<Vec<_>>().join(", ");
    let role_context = format!(
        "{} Key strengths we're looking for: {}. Responsibilities: {}.",
        job_offer.objective, strengths, responsibilities
    );

    let mut prepared_questions = Vec::new();
    if !candidate.skills.is_empty() {
        let skills = candidate.skills.iter().take(SKILLS_IN_QUESTION).cloned().collect::<Vec<_>>().join(", ");
        prepared_questions.push(format!("Tell me about your experience with {}.", skills));
    }
    prepared_questions.push("Tell me about your relevant experience.".to_string());
    prepared_questions.push("What interests you about this role?".to_string());
    prepared_questions.push("Do you have any questions for me?".to_string());

    CallPrompt { role_context, prepared_questions }
}

/// Handles `JobOfferApplied` by preparing the interview prompt ahead of the
/// call. Retries up to three times with exponential backoff; on exhaustion,
/// falls back to `CallPrompt::minimal_default` so the call can still proceed.
pub async fn generate_call_prompt(
    application_id: ApplicationId,
    applications: &dyn ApplicationReader,
    job_offers: &dyn JobOfferReader,
    candidates: &dyn CandidateReader,
    prompts: &dyn PromptRegistry,
) {
    let result = (|| async {
        let application = applications
            .get_application(application_id)
            .await?
            .ok_or_else(|| ScreeningError::NotFound("application not found".into()))?;
        let job_offer = job_offers
            .get_job_offer(application.job_offer_id)
            .await?
            .ok_or_else(|| ScreeningError::NotFound("job offer not found".into()))?;
        let candidate = candidates
            .get_candidate(application.candidate_id)
            .await?
            .ok_or_else(|| ScreeningError::NotFound("candidate not found".into()))?;
        Ok::<CallPrompt, ScreeningError>(build_prompt(&job_offer, &candidate))
    })
    .retry(backoff())
    .notify(|err, dur| {
        tracing::warn!(error = %err, retry_delay_ms = dur.as_millis(), "retrying_call_prompt_generation");
    })
    .await;

    let prompt = match result {
        Ok(prompt) => prompt,
        Err(error) => {
            tracing::error!(
                application_id = %application_id,
                error = %error,
                "call_prompt_generation_exhausted_retries"
            );
            CallPrompt::minimal_default()
        }
    };

    prompts.set_prompt(application_id, prompt).await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use domain::{Candidate, JobOffer, PriorJob, ScreeningApplication};
    use repos::{InMemoryApplicationStore, InMemoryPromptRegistry};

    use super::*;

    async fn seeded_application() -> (Arc<InMemoryApplicationStore>, ApplicationId) {
        let store = Arc::new(InMemoryApplicationStore::new());
        let candidate = Candidate {
            id: domain::CandidateId::new(),
            username: "jdoe".into(),
            full_name: "Jane Doe".into(),
            skills: vec!["Rust".into(), "Kubernetes".into()],
            jobs: vec![PriorJob { title: "Engineer".into(), organization: "Acme".into() }],
        };
        let job_offer = JobOffer {
            id: domain::JobOfferId::new(),
            external_id: "job-1".into(),
            objective: "Build a platform team.".into(),
            strengths: vec!["Rust".into(), "Distributed systems".into()],
            responsibilities: vec!["On-call".into()],
        };
        let application = ScreeningApplication {
            id: ApplicationId::new(),
            candidate_id: candidate.id,
            job_offer_id: job_offer.id,
            created_at: Utc::now(),
        };
        ports::ApplicationWriter::save_application_graph(store.as_ref(), &candidate, &job_offer, &application)
            .await
            .unwrap();
        (store, application.id)
    }

    #[tokio::test]
    async fn builds_a_prompt_referencing_candidate_skills() {
        let (store, application_id) = seeded_application().await;
        let prompts = Arc::new(InMemoryPromptRegistry::new());

        generate_call_prompt(application_id, store.as_ref(), store.as_ref(), store.as_ref(), prompts.as_ref())
            .await;

        let prompt = prompts.get_prompt(application_id).await.unwrap();
        assert!(prompt.prepared_questions[0].contains("Rust"));
        assert_eq!(prompt.prepared_questions.len(), 4);
    }

    #[tokio::test]
    async fn missing_application_falls_back_to_the_minimal_default() {
        let store = Arc::new(InMemoryApplicationStore::new());
        let prompts = Arc::new(InMemoryPromptRegistry::new());
        let application_id = ApplicationId::new();

        generate_call_prompt(application_id, store.as_ref(), store.as_ref(), store.as_ref(), prompts.as_ref())
            .await;

        let prompt = prompts.get_prompt(application_id).await.unwrap();
        assert_eq!(prompt.prepared_questions.len(), 3);
    }
}
