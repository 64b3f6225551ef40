pub mod channel;
pub mod echo;
pub mod engine;
pub mod env;
pub mod human_text;
pub mod interviewer;
pub mod merge;
pub mod messages;
pub mod role_question;
pub mod sanitize;
pub mod state;

pub use channel::DialogChannel;
pub use engine::{DialogConfig, DialogEngine};
pub use env::DialogEnv;
pub use interviewer::{EmmaInterviewer, Interviewer};
pub use messages::{ControlEvent, IncomingMessage, OutgoingMessage};
pub use state::DialogState;
