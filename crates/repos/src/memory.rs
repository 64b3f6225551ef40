use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use domain::{
    ApplicationId, Candidate, CallId, CandidateId, JobOffer, JobOfferId, Result,
    ScreeningAnalysis, ScreeningApplication, ScreeningCall, ScreeningError, TranscriptSegment,
};
use ports::{
    AnalysisReader, AnalysisWriter, ApplicationReader, ApplicationWriter, CallReader, CallWriter,
    CandidateReader, CandidateWriter, JobOfferReader, JobOfferWriter,
};

fn poisoned() -> ScreeningError {
    ScreeningError::Fatal("in-memory repository mutex poisoned".into())
}

/// Candidate, job offer, and application storage, combined the way the
/// original's `InMemoryApplicationRepository` groups all three — an
/// application's identity is indexed by (lowercase username, external job
/// id) so `find_by_username_and_job_offer` can dedupe creation attempts.
#[derive(Default)]
pub struct InMemoryApplicationStore {
    candidates: Mutex<HashMap<CandidateId, Candidate>>,
    job_offers: Mutex<HashMap<JobOfferId, JobOffer>>,
    applications: Mutex<HashMap<ApplicationId, ScreeningApplication>>,
    by_username_and_job: Mutex<HashMap<(String, String), ApplicationId>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateReader for InMemoryApplicationStore {
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.candidates.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }
}

#[async_trait]
impl CandidateWriter for InMemoryApplicationStore {
    async fn save_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.candidates
            .lock()
            .map_err(|_| poisoned())?
            .insert(candidate.id, candidate.clone());
        Ok(())
    }
}

#[async_trait]
impl JobOfferReader for InMemoryApplicationStore {
    async fn get_job_offer(&self, id: JobOfferId) -> Result<Option<JobOffer>> {
        Ok(self.job_offers.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }
}

#[async_trait]
impl JobOfferWriter for InMemoryApplicationStore {
    async fn save_job_offer(&self, job_offer: &JobOffer) -> Result<()> {
        self.job_offers
            .lock()
            .map_err(|_| poisoned())?
            .insert(job_offer.id, job_offer.clone());
        Ok(())
    }
}

#[async_trait]
impl ApplicationReader for InMemoryApplicationStore {
    async fn get_application(&self, id: ApplicationId) -> Result<Option<ScreeningApplication>> {
        Ok(self.applications.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn find_by_username_and_job_offer(
        &self,
        username: &str,
        job_offer_id: &str,
    ) -> Result<Option<ScreeningApplication>> {
        let key = (username.trim().to_lowercase(), job_offer_id.trim().to_string());
        let app_id = {
            let index = self.by_username_and_job.lock().map_err(|_| poisoned())?;
            index.get(&key).copied()
        };
        let Some(app_id) = app_id else {
            return Ok(None);
        };
        self.get_application(app_id).await
    }
}

#[async_trait]
impl ApplicationWriter for InMemoryApplicationStore {
    async fn save_application_graph(
        &self,
        candidate: &Candidate,
        job_offer: &JobOffer,
        application: &ScreeningApplication,
    ) -> Result<()> {
        self.save_candidate(candidate).await?;
        self.save_job_offer(job_offer).await?;
        self.applications
            .lock()
            .map_err(|_| poisoned())?
            .insert(application.id, application.clone());

        let key = (candidate.username.trim().to_lowercase(), job_offer.external_id.clone());
        self.by_username_and_job
            .lock()
            .map_err(|_| poisoned())?
            .insert(key, application.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCallStore {
    calls: Mutex<HashMap<CallId, ScreeningCall>>,
}

impl InMemoryCallStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CallReader for InMemoryCallStore {
    async fn get_call(&self, id: CallId) -> Result<Option<ScreeningCall>> {
        Ok(self.calls.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }
}

#[async_trait]
impl CallWriter for InMemoryCallStore {
    async fn save_call(&self, call: &ScreeningCall) -> Result<()> {
        self.calls.lock().map_err(|_| poisoned())?.insert(call.id, call.clone());
        Ok(())
    }

    async fn update_call_transcript(
        &self,
        call_id: CallId,
        transcript: &[TranscriptSegment],
    ) -> Result<()> {
        if let Some(call) = self.calls.lock().map_err(|_| poisoned())?.get_mut(&call_id) {
            call.transcript = transcript.to_vec();
        }
        Ok(())
    }

    async fn mark_call_completed(&self, call_id: CallId) -> Result<()> {
        if let Some(call) = self.calls.lock().map_err(|_| poisoned())?.get_mut(&call_id) {
            call.ended_at = Some(chrono::Utc::now());
            call.status = domain::CallStatus::Completed;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAnalysisStore {
    by_application: Mutex<HashMap<ApplicationId, ScreeningAnalysis>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisReader for InMemoryAnalysisStore {
    async fn get_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ScreeningAnalysis>> {
        Ok(self
            .by_application
            .lock()
            .map_err(|_| poisoned())?
            .get(&application_id)
            .cloned())
    }
}

#[async_trait]
impl AnalysisWriter for InMemoryAnalysisStore {
    async fn upsert_by_application(&self, analysis: &ScreeningAnalysis) -> Result<()> {
        self.by_application
            .lock()
            .map_err(|_| poisoned())?
            .insert(analysis.application_id, analysis.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEmbeddingStore {
    candidate: Mutex<HashMap<CandidateId, Vec<f32>>>,
    job_offer: Mutex<HashMap<JobOfferId, Vec<f32>>>,
}

impl InMemoryEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ports::EmbeddingRepository for InMemoryEmbeddingStore {
    async fn get_candidate_embedding(&self, id: CandidateId) -> Result<Option<Vec<f32>>> {
        Ok(self.candidate.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn get_job_offer_embedding(&self, id: JobOfferId) -> Result<Option<Vec<f32>>> {
        Ok(self.job_offer.lock().map_err(|_| poisoned())?.get(&id).cloned())
    }

    async fn save_candidate_embedding(&self, id: CandidateId, embedding: Vec<f32>) -> Result<()> {
        self.candidate.lock().map_err(|_| poisoned())?.insert(id, embedding);
        Ok(())
    }

    async fn save_job_offer_embedding(&self, id: JobOfferId, embedding: Vec<f32>) -> Result<()> {
        self.job_offer.lock().map_err(|_| poisoned())?.insert(id, embedding);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPromptRegistry {
    prompts: Mutex<HashMap<ApplicationId, ports::CallPrompt>>,
}

impl InMemoryPromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ports::PromptRegistry for InMemoryPromptRegistry {
    async fn get_prompt(&self, application_id: ApplicationId) -> Option<ports::CallPrompt> {
        self.prompts.lock().ok()?.get(&application_id).cloned()
    }

    async fn set_prompt(&self, application_id: ApplicationId, prompt: ports::CallPrompt) {
        if let Ok(mut guard) = self.prompts.lock() {
            guard.insert(application_id, prompt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CandidateId, JobOfferId};

    fn sample_candidate() -> Candidate {
        Candidate {
            id: CandidateId::new(),
            username: "JohnDoe".into(),
            full_name: "John Doe".into(),
            skills: vec!["Python".into()],
            jobs: vec![],
        }
    }

    fn sample_job_offer() -> JobOffer {
        JobOffer {
            id: JobOfferId::new(),
            external_id: "job123".into(),
            objective: "Build things".into(),
            strengths: vec!["Python".into()],
            responsibilities: vec![],
        }
    }

    #[tokio::test]
    async fn find_by_username_and_job_offer_is_case_insensitive() {
        let store = InMemoryApplicationStore::new();
        let candidate = sample_candidate();
        let job_offer = sample_job_offer();
        let application = ScreeningApplication {
            id: ApplicationId::new(),
            candidate_id: candidate.id,
            job_offer_id: job_offer.id,
            created_at: chrono::Utc::now(),
        };

        store
            .save_application_graph(&candidate, &job_offer, &application)
            .await
            .unwrap();

        let found = store
            .find_by_username_and_job_offer("johndoe", "job123")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, application.id);
    }
}
