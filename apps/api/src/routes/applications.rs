use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use context::AppContext;
use domain::ScreeningError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApplicationRequest {
    pub username: String,
    pub job_offer_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateApplicationResponse {
    pub application_id: String,
}

/// Creates a screening application for a candidate against a job offer.
#[utoipa::path(
    post,
    path = "/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application created or already existed", body = CreateApplicationResponse),
        (status = 400, description = "Missing or empty username/job_offer_id"),
        (status = 404, description = "Candidate or job offer not found"),
        (status = 422, description = "Upstream returned unusable data"),
        (status = 502, description = "Upstream returned a server error"),
        (status = 503, description = "Upstream transport failure or broker unavailable"),
    ),
    tag = "applications",
)]
pub async fn create_application(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateApplicationRequest>,
) -> Result<Response, ScreeningError> {
    let outcome = ctx.applications.create_application(&body.username, &body.job_offer_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateApplicationResponse { application_id: outcome.application_id.to_string() }),
    )
        .into_response())
}
