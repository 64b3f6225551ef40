use async_trait::async_trait;
use domain::Result;

/// Transcribes one accumulated audio turn. Chunks are raw bytes in arrival
/// order; `codec` and `sample_rate_hz` come from the session's `audio_start`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        chunks: &[Vec<u8>],
        codec: &str,
        sample_rate_hz: u32,
    ) -> Result<String>;
}
