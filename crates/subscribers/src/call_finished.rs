use std::time::Duration;

use analysis::AnalysisService;
use backon::{ExponentialBuilder, Retryable};
use domain::{ApplicationId, CallId};

const MAX_ATTEMPTS: usize = 3;
const BASE_DELAY: Duration = Duration::from_secs(1);

fn backoff() -> ExponentialBuilder {
    ExponentialBuilder::default().with_jitter().with_min_delay(BASE_DELAY).with_max_times(MAX_ATTEMPTS)
}

/// Handles `CallFinished` by running the analysis for the completed call.
/// Retries up to three times with exponential backoff; on exhaustion,
/// persists a failed analysis rather than leaving the application without
/// one.
pub async fn handle_call_finished(
    application_id: ApplicationId,
    call_id: CallId,
    analysis: &AnalysisService,
) {
    let result = (|| async { analysis.run_analysis(application_id, call_id).await })
        .retry(backoff())
        .notify(|err, dur| {
            tracing::warn!(error = %err, retry_delay_ms = dur.as_millis(), "retrying_analysis_run");
        })
        .await;

    if let Err(error) = result {
        tracing::error!(
            application_id = %application_id,
            call_id = %call_id,
            error = %error,
            "analysis_run_exhausted_retries"
        );
        if let Err(error) = analysis.persist_analysis_failed(application_id).await {
            tracing::error!(application_id = %application_id, error = %error, "failed_analysis_persist_failed");
        }
    }
}
