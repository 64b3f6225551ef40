/// Named states for tracing and tests; the engine's control flow is the
/// actual driver, this enum exists so each transition can be logged and
/// asserted on rather than inferred from side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    AwaitOpen,
    GreetingSent,
    AwaitingReady,
    AskingQuestion(usize),
    AwaitingAnswer(usize),
    OptionalRoleAnswer(usize),
    NextOrGoodbye,
    Goodbye,
    Closing,
    Closed,
}

impl DialogState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitOpen => "await_open",
            Self::GreetingSent => "greeting_sent",
            Self::AwaitingReady => "awaiting_ready",
            Self::AskingQuestion(_) => "asking_question",
            Self::AwaitingAnswer(_) => "awaiting_answer",
            Self::OptionalRoleAnswer(_) => "optional_role_answer",
            Self::NextOrGoodbye => "next_or_goodbye",
            Self::Goodbye => "goodbye",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}
