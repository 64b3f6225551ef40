pub mod scorer;

use std::sync::Arc;

use bus::EventPublisher;
use chrono::Utc;
use domain::events::AnalysisCompleted;
use domain::{
    AnalysisId, AnalysisStatus, ApplicationId, CallId, DomainEvent, Result, ScreeningAnalysis,
};
use ports::{AnalysisWriter, ApplicationReader, CallReader, CandidateReader, EmbeddingRepository, JobOfferReader};

/// Runs the scorer for one completed call and persists the result. The
/// embedding repository is optional — a deployment without an embedding
/// model simply omits that port and every analysis takes the rule-based
/// scoring path.
pub struct AnalysisService {
    applications: Arc<dyn ApplicationReader>,
    calls: Arc<dyn CallReader>,
    candidates: Arc<dyn CandidateReader>,
    job_offers: Arc<dyn JobOfferReader>,
    analyses: Arc<dyn AnalysisWriter>,
    embeddings: Option<Arc<dyn EmbeddingRepository>>,
    publisher: Arc<dyn EventPublisher>,
}

impl AnalysisService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        applications: Arc<dyn ApplicationReader>,
        calls: Arc<dyn CallReader>,
        candidates: Arc<dyn CandidateReader>,
        job_offers: Arc<dyn JobOfferReader>,
        analyses: Arc<dyn AnalysisWriter>,
        embeddings: Option<Arc<dyn EmbeddingRepository>>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { applications, calls, candidates, job_offers, analyses, embeddings, publisher }
    }

    async fn upsert(
        &self,
        application_id: ApplicationId,
        fit_score: i32,
        skills: Vec<String>,
        status: AnalysisStatus,
    ) -> Result<AnalysisId> {
        let analysis = ScreeningAnalysis {
            id: AnalysisId::new(),
            application_id,
            fit_score,
            skills,
            completed_at: Utc::now(),
            status,
        };
        self.analyses.upsert_by_application(&analysis).await?;
        Ok(analysis.id)
    }

    /// Persists a failed placeholder analysis: score 0, no skills. Used when
    /// the `CallFinished` subscriber exhausts its retries.
    pub async fn persist_analysis_failed(&self, application_id: ApplicationId) -> Result<()> {
        self.upsert(application_id, 0, Vec::new(), AnalysisStatus::Failed).await?;
        Ok(())
    }

    /// Persists a score-0, no-skills analysis marked completed. Used when the
    /// call itself can't be found: the call finished (this subscriber only
    /// runs on `CallFinished`) but its record is gone, which is not a scoring
    /// failure.
    pub async fn persist_default_completed(&self, application_id: ApplicationId) -> Result<()> {
        self.upsert(application_id, 0, Vec::new(), AnalysisStatus::Completed).await?;
        Ok(())
    }

    pub async fn run_analysis(&self, application_id: ApplicationId, call_id: CallId) -> Result<()> {
        let Some(call) = self.calls.get_call(call_id).await? else {
            self.persist_default_completed(application_id).await?;
            return Ok(());
        };

        let application = self.applications.get_application(application_id).await?;
        let candidate = match &application {
            Some(app) => self.candidates.get_candidate(app.candidate_id).await?,
            None => None,
        };
        let job_offer = match &application {
            Some(app) => self.job_offers.get_job_offer(app.job_offer_id).await?,
            None => None,
        };

        let candidate_embedding = match (&self.embeddings, &candidate) {
            (Some(repo), Some(candidate)) => repo.get_candidate_embedding(candidate.id).await?,
            _ => None,
        };
        let job_offer_embedding = match (&self.embeddings, &job_offer) {
            (Some(repo), Some(job_offer)) => repo.get_job_offer_embedding(job_offer.id).await?,
            _ => None,
        };
        let embeddings = match (&candidate_embedding, &job_offer_embedding) {
            (Some(c), Some(j)) => Some((c.as_slice(), j.as_slice())),
            _ => None,
        };

        let (fit_score, skills) =
            scorer::score(&call.transcript, candidate.as_ref(), job_offer.as_ref(), embeddings);

        let analysis_id = self.upsert(application_id, fit_score, skills, AnalysisStatus::Completed).await?;

        self.publisher
            .publish(DomainEvent::AnalysisCompleted(AnalysisCompleted {
                occurred_at: Utc::now(),
                application_id,
                analysis_id,
            }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use domain::{Candidate, JobOffer, ScreeningApplication, Speaker, TranscriptSegment};
    use repos::{InMemoryAnalysisStore, InMemoryApplicationStore, InMemoryCallStore};

    use super::*;

    struct NoopPublisher;

    #[async_trait]
    impl EventPublisher for NoopPublisher {
        async fn publish(&self, _event: DomainEvent) -> Result<()> {
            Ok(())
        }
        fn subscribe(&self, _handler: bus::EventHandler) {}
    }

    async fn seeded_application(
        store: &InMemoryApplicationStore,
    ) -> (ApplicationId, Candidate, JobOffer) {
        let candidate = Candidate {
            id: domain::CandidateId::new(),
            username: "jdoe".into(),
            full_name: "Jane Doe".into(),
            skills: vec!["Rust".into()],
            jobs: vec![],
        };
        let job_offer = JobOffer {
            id: domain::JobOfferId::new(),
            external_id: "job1".into(),
            objective: "Build backend systems".into(),
            strengths: vec!["Rust".into(), "SQL".into()],
            responsibilities: vec![],
        };
        let application = ScreeningApplication {
            id: ApplicationId::new(),
            candidate_id: candidate.id,
            job_offer_id: job_offer.id,
            created_at: Utc::now(),
        };
        ports::ApplicationWriter::save_application_graph(store, &candidate, &job_offer, &application)
            .await
            .unwrap();
        (application.id, candidate, job_offer)
    }

    #[tokio::test]
    async fn missing_call_persists_a_completed_score_zero_analysis() {
        let applications = Arc::new(InMemoryApplicationStore::new());
        let calls = Arc::new(InMemoryCallStore::new());
        let analyses = Arc::new(InMemoryAnalysisStore::new());
        let service = AnalysisService::new(
            applications.clone(),
            calls,
            applications.clone(),
            applications.clone(),
            analyses.clone(),
            None,
            Arc::new(NoopPublisher),
        );

        let application_id = ApplicationId::new();
        service.run_analysis(application_id, CallId::new()).await.unwrap();

        let analysis = ports::AnalysisReader::get_by_application(analyses.as_ref(), application_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Completed);
        assert_eq!(analysis.fit_score, 0);
        assert!(analysis.skills.is_empty());
    }

    #[tokio::test]
    async fn persist_analysis_failed_marks_status_failed() {
        let applications = Arc::new(InMemoryApplicationStore::new());
        let calls = Arc::new(InMemoryCallStore::new());
        let analyses = Arc::new(InMemoryAnalysisStore::new());
        let service = AnalysisService::new(
            applications.clone(),
            calls,
            applications.clone(),
            applications,
            analyses.clone(),
            None,
            Arc::new(NoopPublisher),
        );

        let application_id = ApplicationId::new();
        service.persist_analysis_failed(application_id).await.unwrap();

        let analysis = ports::AnalysisReader::get_by_application(analyses.as_ref(), application_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Failed);
    }

    #[tokio::test]
    async fn completed_call_scores_with_the_rule_based_fallback() {
        let applications = Arc::new(InMemoryApplicationStore::new());
        let calls = Arc::new(InMemoryCallStore::new());
        let analyses = Arc::new(InMemoryAnalysisStore::new());
        let (application_id, ..) = seeded_application(&applications).await;

        let call = domain::ScreeningCall {
            id: CallId::new(),
            application_id,
            status: domain::CallStatus::Completed,
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            transcript: vec![
                TranscriptSegment { speaker: Speaker::Emma, text: "Tell me about Rust.".into(), timestamp: 0.0 },
                TranscriptSegment {
                    speaker: Speaker::Candidate,
                    text: "I've worked with Rust for years.".into(),
                    timestamp: 1.0,
                },
            ],
        };
        ports::CallWriter::save_call(calls.as_ref(), &call).await.unwrap();

        let service = AnalysisService::new(
            applications.clone(),
            calls,
            applications.clone(),
            applications.clone(),
            analyses.clone(),
            None,
            Arc::new(NoopPublisher),
        );

        service.run_analysis(application_id, call.id).await.unwrap();

        let analysis = ports::AnalysisReader::get_by_application(analyses.as_ref(), application_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Completed);
        assert_eq!(analysis.skills, vec!["Rust".to_string()]);
        assert_eq!(analysis.fit_score, 40 + 5 * 2 + 10);
    }
}
