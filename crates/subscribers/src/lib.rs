pub mod call_finished;
pub mod embeddings;
pub mod prompt;

pub use call_finished::handle_call_finished;
pub use embeddings::{generate_candidate_embeddings, generate_job_offer_embeddings};
pub use prompt::generate_call_prompt;
