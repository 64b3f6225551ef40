pub mod chat;
pub mod embeddings;
pub mod prompts;
pub mod repos;
pub mod transcriber;
pub mod upstream;

pub use chat::ChatModel;
pub use embeddings::{EmbeddingModel, EmbeddingRepository};
pub use prompts::{CallPrompt, PromptRegistry};
pub use repos::{
    AnalysisReader, AnalysisWriter, ApplicationReader, ApplicationWriter, CallReader, CallWriter,
    CandidateReader, CandidateWriter, JobOfferReader, JobOfferWriter,
};
pub use transcriber::Transcriber;
pub use upstream::{BiosPort, CandidateProfile, JobOfferListing, OpportunitiesPort};
