pub mod entities;
pub mod envelope;
pub mod error;
pub mod events;
pub mod ids;

pub use entities::*;
pub use error::{Result, ScreeningError, UpstreamFailureKind};
pub use events::DomainEvent;
pub use ids::{AnalysisId, ApplicationId, CallId, CandidateId, JobOfferId};
