mod chat;
mod embedding;
mod env;
mod transcriber;

pub use chat::HttpChatModel;
pub use embedding::HttpEmbeddingModel;
pub use env::ModelsEnv;
pub use transcriber::HttpTranscriber;
