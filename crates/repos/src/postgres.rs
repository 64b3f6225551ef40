use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use domain::{
    AnalysisStatus, ApplicationId, Candidate, CallId, CallStatus, CandidateId, JobOffer,
    JobOfferId, PriorJob, Result, ScreeningAnalysis, ScreeningApplication, ScreeningCall,
    ScreeningError, TranscriptSegment,
};
use ports::{
    AnalysisReader, AnalysisWriter, ApplicationReader, ApplicationWriter, CallReader, CallWriter,
    CandidateReader, CandidateWriter, JobOfferReader, JobOfferWriter,
};

fn storage_err(e: sqlx::Error) -> ScreeningError {
    ScreeningError::Fatal(e.to_string())
}

/// Postgres-backed application/candidate/job-offer storage. Table layout
/// mirrors the in-memory store's shape, with `skills`/`jobs`/`strengths`/
/// `responsibilities` stored as JSON columns since they're read-modify-write
/// as whole lists, never queried element-wise.
pub struct PostgresApplicationStore {
    pool: PgPool,
}

impl PostgresApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL,
                full_name TEXT NOT NULL,
                skills JSONB NOT NULL,
                jobs JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_offers (
                id UUID PRIMARY KEY,
                external_id TEXT NOT NULL,
                objective TEXT NOT NULL,
                strengths JSONB NOT NULL,
                responsibilities JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id UUID PRIMARY KEY,
                candidate_id UUID NOT NULL REFERENCES candidates(id),
                job_offer_id UUID NOT NULL REFERENCES job_offers(id),
                created_at TIMESTAMPTZ NOT NULL,
                username_lower TEXT NOT NULL,
                job_external_id TEXT NOT NULL,
                UNIQUE (username_lower, job_external_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: uuid::Uuid,
    username: String,
    full_name: String,
    skills: serde_json::Value,
    jobs: serde_json::Value,
}

impl CandidateRow {
    fn into_candidate(self) -> Result<Candidate> {
        Ok(Candidate {
            id: CandidateId::from_uuid(self.id),
            username: self.username,
            full_name: self.full_name,
            skills: serde_json::from_value(self.skills).map_err(|e| ScreeningError::Fatal(e.to_string()))?,
            jobs: serde_json::from_value::<Vec<PriorJob>>(self.jobs)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
        })
    }
}

#[async_trait]
impl CandidateReader for PostgresApplicationStore {
    async fn get_candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        let row: Option<CandidateRow> = sqlx::query_as(
            "SELECT id, username, full_name, skills, jobs FROM candidates WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(CandidateRow::into_candidate).transpose()
    }
}

#[async_trait]
impl CandidateWriter for PostgresApplicationStore {
    async fn save_candidate(&self, candidate: &Candidate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO candidates (id, username, full_name, skills, jobs)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                full_name = EXCLUDED.full_name,
                skills = EXCLUDED.skills,
                jobs = EXCLUDED.jobs
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(&candidate.username)
        .bind(&candidate.full_name)
        .bind(serde_json::to_value(&candidate.skills).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .bind(serde_json::to_value(&candidate.jobs).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct JobOfferRow {
    id: uuid::Uuid,
    external_id: String,
    objective: String,
    strengths: serde_json::Value,
    responsibilities: serde_json::Value,
}

impl JobOfferRow {
    fn into_job_offer(self) -> Result<JobOffer> {
        Ok(JobOffer {
            id: JobOfferId::from_uuid(self.id),
            external_id: self.external_id,
            objective: self.objective,
            strengths: serde_json::from_value(self.strengths)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
            responsibilities: serde_json::from_value(self.responsibilities)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
        })
    }
}

#[async_trait]
impl JobOfferReader for PostgresApplicationStore {
    async fn get_job_offer(&self, id: JobOfferId) -> Result<Option<JobOffer>> {
        let row: Option<JobOfferRow> = sqlx::query_as(
            "SELECT id, external_id, objective, strengths, responsibilities FROM job_offers WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(JobOfferRow::into_job_offer).transpose()
    }
}

#[async_trait]
impl JobOfferWriter for PostgresApplicationStore {
    async fn save_job_offer(&self, job_offer: &JobOffer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_offers (id, external_id, objective, strengths, responsibilities)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                external_id = EXCLUDED.external_id,
                objective = EXCLUDED.objective,
                strengths = EXCLUDED.strengths,
                responsibilities = EXCLUDED.responsibilities
            "#,
        )
        .bind(job_offer.id.as_uuid())
        .bind(&job_offer.external_id)
        .bind(&job_offer.objective)
        .bind(serde_json::to_value(&job_offer.strengths).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .bind(
            serde_json::to_value(&job_offer.responsibilities)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: uuid::Uuid,
    candidate_id: uuid::Uuid,
    job_offer_id: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ScreeningApplication {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: ApplicationId::from_uuid(row.id),
            candidate_id: CandidateId::from_uuid(row.candidate_id),
            job_offer_id: JobOfferId::from_uuid(row.job_offer_id),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ApplicationReader for PostgresApplicationStore {
    async fn get_application(&self, id: ApplicationId) -> Result<Option<ScreeningApplication>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "SELECT id, candidate_id, job_offer_id, created_at FROM applications WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(ScreeningApplication::from))
    }

    async fn find_by_username_and_job_offer(
        &self,
        username: &str,
        job_offer_id: &str,
    ) -> Result<Option<ScreeningApplication>> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            r#"
            SELECT id, candidate_id, job_offer_id, created_at FROM applications
            WHERE username_lower = $1 AND job_external_id = $2
            "#,
        )
        .bind(username.trim().to_lowercase())
        .bind(job_offer_id.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(ScreeningApplication::from))
    }
}

#[async_trait]
impl ApplicationWriter for PostgresApplicationStore {
    async fn save_application_graph(
        &self,
        candidate: &Candidate,
        job_offer: &JobOffer,
        application: &ScreeningApplication,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO candidates (id, username, full_name, skills, jobs)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username, full_name = EXCLUDED.full_name,
                skills = EXCLUDED.skills, jobs = EXCLUDED.jobs
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(&candidate.username)
        .bind(&candidate.full_name)
        .bind(serde_json::to_value(&candidate.skills).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .bind(serde_json::to_value(&candidate.jobs).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO job_offers (id, external_id, objective, strengths, responsibilities)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                external_id = EXCLUDED.external_id, objective = EXCLUDED.objective,
                strengths = EXCLUDED.strengths, responsibilities = EXCLUDED.responsibilities
            "#,
        )
        .bind(job_offer.id.as_uuid())
        .bind(&job_offer.external_id)
        .bind(&job_offer.objective)
        .bind(serde_json::to_value(&job_offer.strengths).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .bind(
            serde_json::to_value(&job_offer.responsibilities)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
        )
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, candidate_id, job_offer_id, created_at, username_lower, job_external_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(candidate.id.as_uuid())
        .bind(job_offer.id.as_uuid())
        .bind(application.created_at)
        .bind(candidate.username.trim().to_lowercase())
        .bind(&job_offer.external_id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }
}

/// Postgres-backed call storage. `transcript` is stored as a single JSON
/// array column, rewritten wholesale on each update — matches the
/// in-memory store's replace-on-write semantics.
pub struct PostgresCallStore {
    pool: PgPool,
}

impl PostgresCallStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS calls (
                id UUID PRIMARY KEY,
                application_id UUID NOT NULL,
                status TEXT NOT NULL,
                started_at TIMESTAMPTZ NOT NULL,
                ended_at TIMESTAMPTZ,
                transcript JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

fn status_to_str(status: CallStatus) -> &'static str {
    match status {
        CallStatus::InProgress => "in_progress",
        CallStatus::Completed => "completed",
        CallStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> CallStatus {
    match s {
        "completed" => CallStatus::Completed,
        "failed" => CallStatus::Failed,
        _ => CallStatus::InProgress,
    }
}

#[derive(sqlx::FromRow)]
struct CallRow {
    id: uuid::Uuid,
    application_id: uuid::Uuid,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    transcript: serde_json::Value,
}

impl CallRow {
    fn into_call(self) -> Result<ScreeningCall> {
        Ok(ScreeningCall {
            id: CallId::from_uuid(self.id),
            application_id: ApplicationId::from_uuid(self.application_id),
            status: status_from_str(&self.status),
            started_at: self.started_at,
            ended_at: self.ended_at,
            transcript: serde_json::from_value::<Vec<TranscriptSegment>>(self.transcript)
                .map_err(|e| ScreeningError::Fatal(e.to_string()))?,
        })
    }
}

#[async_trait]
impl CallReader for PostgresCallStore {
    async fn get_call(&self, id: CallId) -> Result<Option<ScreeningCall>> {
        let row: Option<CallRow> = sqlx::query_as(
            "SELECT id, application_id, status, started_at, ended_at, transcript FROM calls WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(CallRow::into_call).transpose()
    }
}

#[async_trait]
impl CallWriter for PostgresCallStore {
    async fn save_call(&self, call: &ScreeningCall) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calls (id, application_id, status, started_at, ended_at, transcript)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status, ended_at = EXCLUDED.ended_at, transcript = EXCLUDED.transcript
            "#,
        )
        .bind(call.id.as_uuid())
        .bind(call.application_id.as_uuid())
        .bind(status_to_str(call.status))
        .bind(call.started_at)
        .bind(call.ended_at)
        .bind(serde_json::to_value(&call.transcript).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn update_call_transcript(
        &self,
        call_id: CallId,
        transcript: &[TranscriptSegment],
    ) -> Result<()> {
        sqlx::query("UPDATE calls SET transcript = $2 WHERE id = $1")
            .bind(call_id.as_uuid())
            .bind(serde_json::to_value(transcript).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn mark_call_completed(&self, call_id: CallId) -> Result<()> {
        sqlx::query("UPDATE calls SET status = 'completed', ended_at = now() WHERE id = $1")
            .bind(call_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

/// Postgres-backed analysis storage, upserted by `application_id`.
pub struct PostgresAnalysisStore {
    pool: PgPool,
}

impl PostgresAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id UUID PRIMARY KEY,
                application_id UUID NOT NULL UNIQUE,
                fit_score INTEGER NOT NULL,
                skills JSONB NOT NULL,
                completed_at TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

fn analysis_status_to_str(status: AnalysisStatus) -> &'static str {
    match status {
        AnalysisStatus::Completed => "completed",
        AnalysisStatus::Failed => "failed",
    }
}

#[derive(sqlx::FromRow)]
struct AnalysisRow {
    id: uuid::Uuid,
    application_id: uuid::Uuid,
    fit_score: i32,
    skills: serde_json::Value,
    completed_at: DateTime<Utc>,
    status: String,
}

impl AnalysisRow {
    fn into_analysis(self) -> Result<ScreeningAnalysis> {
        Ok(ScreeningAnalysis {
            id: domain::AnalysisId::from_uuid(self.id),
            application_id: ApplicationId::from_uuid(self.application_id),
            fit_score: self.fit_score,
            skills: serde_json::from_value(self.skills).map_err(|e| ScreeningError::Fatal(e.to_string()))?,
            completed_at: self.completed_at,
            status: if self.status == "failed" {
                AnalysisStatus::Failed
            } else {
                AnalysisStatus::Completed
            },
        })
    }
}

#[async_trait]
impl AnalysisReader for PostgresAnalysisStore {
    async fn get_by_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<Option<ScreeningAnalysis>> {
        let row: Option<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT id, application_id, fit_score, skills, completed_at, status
            FROM analyses WHERE application_id = $1
            "#,
        )
        .bind(application_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(AnalysisRow::into_analysis).transpose()
    }
}

#[async_trait]
impl AnalysisWriter for PostgresAnalysisStore {
    async fn upsert_by_application(&self, analysis: &ScreeningAnalysis) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analyses (id, application_id, fit_score, skills, completed_at, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (application_id) DO UPDATE SET
                fit_score = EXCLUDED.fit_score, skills = EXCLUDED.skills,
                completed_at = EXCLUDED.completed_at, status = EXCLUDED.status
            "#,
        )
        .bind(analysis.id.as_uuid())
        .bind(analysis.application_id.as_uuid())
        .bind(analysis.fit_score)
        .bind(serde_json::to_value(&analysis.skills).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .bind(analysis.completed_at)
        .bind(analysis_status_to_str(analysis.status))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

/// Postgres-backed embedding storage, one row per entity keyed by a
/// `(kind, id)` pair so candidate and job-offer vectors share a table.
pub struct PostgresEmbeddingStore {
    pool: PgPool,
}

impl PostgresEmbeddingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                kind TEXT NOT NULL,
                entity_id UUID NOT NULL,
                vector JSONB NOT NULL,
                PRIMARY KEY (kind, entity_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get(&self, kind: &str, id: uuid::Uuid) -> Result<Option<Vec<f32>>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT vector FROM embeddings WHERE kind = $1 AND entity_id = $2")
                .bind(kind)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;

        row.map(|(v,)| serde_json::from_value(v).map_err(|e| ScreeningError::Fatal(e.to_string())))
            .transpose()
    }

    async fn save(&self, kind: &str, id: uuid::Uuid, embedding: Vec<f32>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO embeddings (kind, entity_id, vector)
            VALUES ($1, $2, $3)
            ON CONFLICT (kind, entity_id) DO UPDATE SET vector = EXCLUDED.vector
            "#,
        )
        .bind(kind)
        .bind(id)
        .bind(serde_json::to_value(&embedding).map_err(|e| ScreeningError::Fatal(e.to_string()))?)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }
}

#[async_trait]
impl ports::EmbeddingRepository for PostgresEmbeddingStore {
    async fn get_candidate_embedding(&self, id: CandidateId) -> Result<Option<Vec<f32>>> {
        self.get("candidate", id.as_uuid()).await
    }

    async fn get_job_offer_embedding(&self, id: JobOfferId) -> Result<Option<Vec<f32>>> {
        self.get("job_offer", id.as_uuid()).await
    }

    async fn save_candidate_embedding(&self, id: CandidateId, embedding: Vec<f32>) -> Result<()> {
        self.save("candidate", id.as_uuid(), embedding).await
    }

    async fn save_job_offer_embedding(&self, id: JobOfferId, embedding: Vec<f32>) -> Result<()> {
        self.save("job_offer", id.as_uuid(), embedding).await
    }
}
