use std::sync::Arc;

use bus::EventPublisher;
use ports::{
    AnalysisReader, AnalysisWriter, ApplicationReader, ApplicationWriter, BiosPort, CallReader,
    CallWriter, CandidateReader, ChatModel, EmbeddingModel, EmbeddingRepository, JobOfferReader,
    OpportunitiesPort, PromptRegistry, Transcriber,
};

/// Every capability port the composition root needs, already resolved to a
/// concrete adapter (in-memory or Postgres, in-process or HTTP). Kept as a
/// plain bag of `Arc<dyn Trait>` so `AppContext::assemble` never has to know
/// which adapter backs a given port.
pub struct Ports {
    pub application_reader: Arc<dyn ApplicationReader>,
    pub application_writer: Arc<dyn ApplicationWriter>,
    pub candidate_reader: Arc<dyn CandidateReader>,
    pub job_offer_reader: Arc<dyn JobOfferReader>,
    pub call_reader: Arc<dyn CallReader>,
    pub call_writer: Arc<dyn CallWriter>,
    pub analysis_reader: Arc<dyn AnalysisReader>,
    pub analysis_writer: Arc<dyn AnalysisWriter>,
    pub embeddings: Arc<dyn EmbeddingRepository>,
    pub prompts: Arc<dyn PromptRegistry>,
    pub bios: Arc<dyn BiosPort>,
    pub opportunities: Arc<dyn OpportunitiesPort>,
    pub embedding_model: Arc<dyn EmbeddingModel>,
    pub chat_model: Arc<dyn ChatModel>,
    pub transcriber: Arc<dyn Transcriber>,
    pub publisher: Arc<dyn EventPublisher>,
}
