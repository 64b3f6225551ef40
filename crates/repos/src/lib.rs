pub mod memory;
pub mod postgres;

pub use memory::{
    InMemoryAnalysisStore, InMemoryApplicationStore, InMemoryCallStore, InMemoryEmbeddingStore,
    InMemoryPromptRegistry,
};
pub use postgres::{
    PostgresAnalysisStore, PostgresApplicationStore, PostgresCallStore, PostgresEmbeddingStore,
};
