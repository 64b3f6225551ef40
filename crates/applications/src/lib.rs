mod lock;

use std::sync::Arc;

use bus::EventPublisher;
use chrono::Utc;
use domain::events::JobOfferApplied;
use domain::{ApplicationId, Candidate, DomainEvent, JobOffer, Result, ScreeningApplication, ScreeningError};
use ports::{ApplicationReader, ApplicationWriter, BiosPort, OpportunitiesPort};

use lock::KeyedLockTable;

/// Result of `create_application`: whether the application already existed
/// for this (username, job_offer_id) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationOutcome {
    pub application_id: ApplicationId,
    pub created: bool,
}

pub struct ApplicationService {
    applications: Arc<dyn ApplicationReader>,
    writer: Arc<dyn ApplicationWriter>,
    bios: Arc<dyn BiosPort>,
    opportunities: Arc<dyn OpportunitiesPort>,
    publisher: Arc<dyn EventPublisher>,
    locks: KeyedLockTable<(String, String)>,
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationReader>,
        writer: Arc<dyn ApplicationWriter>,
        bios: Arc<dyn BiosPort>,
        opportunities: Arc<dyn OpportunitiesPort>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self { applications, writer, bios, opportunities, publisher, locks: KeyedLockTable::new() }
    }

    pub async fn create_application(
        &self,
        username: &str,
        job_offer_id: &str,
    ) -> Result<ApplicationOutcome> {
        let username = username.trim();
        let job_offer_id = job_offer_id.trim();
        if username.is_empty() || job_offer_id.is_empty() {
            return Err(ScreeningError::InvalidArgument(
                "username and job_offer_id must not be empty".into(),
            ));
        }

        let lower_username = username.to_lowercase();
        let _guard = self.locks.lock((lower_username, job_offer_id.to_string())).await;

        if let Some(existing) = self.applications.find_by_username_and_job_offer(username, job_offer_id).await? {
            return Ok(ApplicationOutcome { application_id: existing.id, created: false });
        }

        let bio = self
            .bios
            .get_bio(username)
            .await
            .map_err(upstream)?
            .ok_or_else(|| ScreeningError::NotFound("Candidate not found".into()))?;

        let listing = self
            .opportunities
            .get_opportunity(job_offer_id)
            .await
            .map_err(upstream)?
            .ok_or_else(|| ScreeningError::NotFound("Job offer not found".into()))?;

        let candidate = Candidate {
            id: domain::CandidateId::new(),
            username: bio.username,
            full_name: bio.full_name,
            skills: bio.skills,
            jobs: bio.jobs,
        };
        let job_offer = JobOffer {
            id: domain::JobOfferId::new(),
            external_id: listing.external_id,
            objective: listing.objective,
            strengths: listing.strengths,
            responsibilities: listing.responsibilities,
        };
        let application = ScreeningApplication {
            id: ApplicationId::new(),
            candidate_id: candidate.id,
            job_offer_id: job_offer.id,
            created_at: Utc::now(),
        };

        self.writer.save_application_graph(&candidate, &job_offer, &application).await?;

        self.publisher
            .publish(DomainEvent::JobOfferApplied(JobOfferApplied {
                occurred_at: Utc::now(),
                candidate_id: candidate.id,
                job_offer_id: job_offer.id,
                application_id: application.id,
            }))
            .await?;

        Ok(ApplicationOutcome { application_id: application.id, created: true })
    }
}

/// Any port-level error other than a null result is an upstream failure —
/// the ports themselves already distinguish unusable-response/5xx/transport
/// via `UpstreamFailureKind`, so this just passes that through, defaulting
/// to `Transport` for an error shape the port never documented returning.
fn upstream(e: ScreeningError) -> ScreeningError {
    match e {
        ScreeningError::UpstreamFailure(_, _) => e,
        other => ScreeningError::UpstreamFailure(domain::UpstreamFailureKind::Transport, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ports::{CandidateProfile, JobOfferListing};
    use repos::InMemoryApplicationStore;

    use super::*;

    struct FakeBios;

    #[async_trait]
    impl BiosPort for FakeBios {
        async fn get_bio(&self, username: &str) -> Result<Option<CandidateProfile>> {
            if username == "missing" {
                return Ok(None);
            }
            Ok(Some(CandidateProfile {
                username: username.to_string(),
                full_name: "Jane Doe".to_string(),
                skills: vec!["Rust".to_string()],
                jobs: vec![],
            }))
        }
    }

    struct FakeOpportunities;

    #[async_trait]
    impl OpportunitiesPort for FakeOpportunities {
        async fn get_opportunity(&self, job_offer_id: &str) -> Result<Option<JobOfferListing>> {
            Ok(Some(JobOfferListing {
                external_id: job_offer_id.to_string(),
                objective: "Build things".to_string(),
                strengths: vec!["Rust".to_string()],
                responsibilities: vec![],
            }))
        }
    }

    struct CountingPublisher {
        count: AtomicUsize,
    }

    #[async_trait]
    impl EventPublisher for CountingPublisher {
        async fn publish(&self, _event: DomainEvent) -> Result<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn subscribe(&self, _handler: bus::EventHandler) {}
    }

    fn service(publisher: Arc<CountingPublisher>) -> (ApplicationService, Arc<InMemoryApplicationStore>) {
        let store = Arc::new(InMemoryApplicationStore::new());
        let service = ApplicationService::new(
            store.clone(),
            store.clone(),
            Arc::new(FakeBios),
            Arc::new(FakeOpportunities),
            publisher,
        );
        (service, store)
    }

    #[tokio::test]
    async fn creates_a_new_application_and_publishes() {
        let publisher = Arc::new(CountingPublisher { count: AtomicUsize::new(0) });
        let (service, _store) = service(publisher.clone());

        let outcome = service.create_application("JohnDoe", "job-123").await.unwrap();
        assert!(outcome.created);
        assert_eq!(publisher.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeat_application_returns_existing_without_publishing_again() {
        let publisher = Arc::new(CountingPublisher { count: AtomicUsize::new(0) });
        let (service, _store) = service(publisher.clone());

        let first = service.create_application("johndoe", "job-123").await.unwrap();
        let second = service.create_application("JohnDoe", "job-123").await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.application_id, second.application_id);
        assert_eq!(publisher.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_username_is_an_invalid_argument() {
        let publisher = Arc::new(CountingPublisher { count: AtomicUsize::new(0) });
        let (service, _store) = service(publisher);

        let err = service.create_application("   ", "job-123").await.unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn missing_candidate_is_not_found() {
        let publisher = Arc::new(CountingPublisher { count: AtomicUsize::new(0) });
        let (service, _store) = service(publisher);

        let err = service.create_application("missing", "job-123").await.unwrap_err();
        assert!(matches!(err, ScreeningError::NotFound(_)));
    }
}
