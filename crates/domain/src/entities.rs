use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AnalysisId, ApplicationId, CallId, CandidateId, JobOfferId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorJob {
    pub title: String,
    pub organization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub username: String,
    pub full_name: String,
    pub skills: Vec<String>,
    pub jobs: Vec<PriorJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOffer {
    pub id: JobOfferId,
    pub external_id: String,
    pub objective: String,
    pub strengths: Vec<String>,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningApplication {
    pub id: ApplicationId,
    pub candidate_id: CandidateId,
    pub job_offer_id: JobOfferId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Emma,
    Candidate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub speaker: Speaker,
    pub text: String,
    /// Monotonic seconds since call start.
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningCall {
    pub id: CallId,
    pub application_id: ApplicationId,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub transcript: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningAnalysis {
    pub id: AnalysisId,
    pub application_id: ApplicationId,
    pub fit_score: i32,
    pub skills: Vec<String>,
    pub completed_at: DateTime<Utc>,
    pub status: AnalysisStatus,
}
