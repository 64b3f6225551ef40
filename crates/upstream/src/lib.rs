mod bios;
mod env;
mod opportunities;

pub use bios::HttpBiosPort;
pub use env::UpstreamEnv;
pub use opportunities::HttpOpportunitiesPort;

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use domain::{ScreeningError, UpstreamFailureKind};

fn backoff(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_jitter()
        .with_min_delay(Duration::from_millis(200))
        .with_max_times(max_times)
}

/// Maps a transport-level reqwest error to the upstream-failure kind the
/// HTTP boundary needs to pick 502 vs 503. Anything that never got a
/// response (connect, timeout, DNS) is `Transport`; a response the server
/// actually sent back is handled by the caller from the status code.
fn transport_error(e: reqwest::Error) -> ScreeningError {
    ScreeningError::UpstreamFailure(UpstreamFailureKind::Transport, e.to_string())
}

async fn retrying<T, F, Fut>(max_times: usize, op: F) -> Result<T, ScreeningError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ScreeningError>>,
{
    op.retry(backoff(max_times))
        .notify(|err, dur| {
            tracing::warn!(error = %err, retry_delay_ms = dur.as_millis(), "retrying_upstream_lookup");
        })
        .when(|e| matches!(e, ScreeningError::UpstreamFailure(UpstreamFailureKind::Transport, _)))
        .await
}
