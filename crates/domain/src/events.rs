use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnalysisId, ApplicationId, CallId, CandidateId, JobOfferId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOfferApplied {
    pub occurred_at: DateTime<Utc>,
    pub candidate_id: CandidateId,
    pub job_offer_id: JobOfferId,
    pub application_id: ApplicationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFinished {
    pub occurred_at: DateTime<Utc>,
    pub application_id: ApplicationId,
    pub call_id: CallId,
}

/// Published when analysis for an application completes successfully.
/// Never published from the failed-state path (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisCompleted {
    pub occurred_at: DateTime<Utc>,
    pub application_id: ApplicationId,
    pub analysis_id: AnalysisId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DomainEvent {
    JobOfferApplied(JobOfferApplied),
    CallFinished(CallFinished),
    AnalysisCompleted(AnalysisCompleted),
}

impl DomainEvent {
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::JobOfferApplied(e) => e.occurred_at,
            Self::CallFinished(e) => e.occurred_at,
            Self::AnalysisCompleted(e) => e.occurred_at,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::JobOfferApplied(_) => "JobOfferApplied",
            Self::CallFinished(_) => "CallFinished",
            Self::AnalysisCompleted(_) => "AnalysisCompleted",
        }
    }
}

impl From<JobOfferApplied> for DomainEvent {
    fn from(e: JobOfferApplied) -> Self {
        Self::JobOfferApplied(e)
    }
}

impl From<CallFinished> for DomainEvent {
    fn from(e: CallFinished) -> Self {
        Self::CallFinished(e)
    }
}

impl From<AnalysisCompleted> for DomainEvent {
    fn from(e: AnalysisCompleted) -> Self {
        Self::AnalysisCompleted(e)
    }
}
