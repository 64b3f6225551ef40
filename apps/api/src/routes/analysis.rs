use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use context::AppContext;
use domain::{AnalysisStatus, ApplicationId};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub fit_score: i32,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<bool>,
}

/// Looks up the analysis for an application: 200 once scoring finished
/// (success or failed), 202 while it's still in flight, 404 when the
/// application id is malformed or unknown.
#[utoipa::path(
    get,
    path = "/applications/{application_id}/analysis",
    params(("application_id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Analysis complete", body = AnalysisResponse),
        (status = 202, description = "Analysis not ready yet"),
        (status = 404, description = "Application id malformed or unknown"),
    ),
    tag = "analysis",
)]
pub async fn get_analysis(State(ctx): State<Arc<AppContext>>, Path(application_id): Path<String>) -> Response {
    let Ok(application_id) = application_id.parse::<ApplicationId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match ctx.application_reader.get_application(application_id).await {
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
        Ok(Some(_)) => match ctx.analysis_reader.get_by_application(application_id).await {
            Ok(None) | Err(_) => (StatusCode::ACCEPTED, Json(serde_json::json!({}))).into_response(),
            Ok(Some(analysis)) => (
                StatusCode::OK,
                Json(AnalysisResponse {
                    fit_score: analysis.fit_score,
                    skills: analysis.skills,
                    failed: (analysis.status == AnalysisStatus::Failed).then_some(true),
                }),
            )
                .into_response(),
        },
    }
}
