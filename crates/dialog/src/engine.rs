use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use domain::{Result, Speaker, TranscriptSegment};
use ports::{CallPrompt, Transcriber};

use crate::channel::DialogChannel;
use crate::echo::is_echo;
use crate::human_text::is_human_text;
use crate::interviewer::Interviewer;
use crate::merge::merge_fragments;
use crate::messages::{ControlEvent, IncomingMessage, OutgoingMessage};
use crate::role_question::is_role_question;
use crate::sanitize::sanitize_text;
use crate::state::DialogState;

const NO_RESPONSE: &str = "[no response]";

#[derive(Debug, Clone, Copy)]
pub struct DialogConfig {
    pub ready_base: Duration,
    pub ready_max: Duration,
    pub answer: Duration,
    pub silence_retries: u32,
    pub fragment_continuation: Duration,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            ready_base: Duration::from_secs(5),
            ready_max: Duration::from_secs(20),
            answer: Duration::from_secs(45),
            silence_retries: 2,
            fragment_continuation: Duration::from_millis(2200),
        }
    }
}

enum TurnOutcome {
    Text(String),
    NoResponse,
}

struct PendingAudio {
    chunks: Vec<Vec<u8>>,
    codec: String,
    sample_rate_hz: u32,
}

/// Drives one streaming session's Q&A loop. Assumes the caller already
/// performed the handshake (`start_call`, active-call registration) and
/// will perform `end_call` with the transcript this returns.
pub struct DialogEngine<'a> {
    channel: &'a mut dyn DialogChannel,
    interviewer: &'a dyn Interviewer,
    transcriber: &'a dyn Transcriber,
    config: DialogConfig,
    start: Instant,
    transcript: Vec<TranscriptSegment>,
    last_emma_text: String,
    state: DialogState,
}

impl<'a> DialogEngine<'a> {
    pub fn new(
        channel: &'a mut dyn DialogChannel,
        interviewer: &'a dyn Interviewer,
        transcriber: &'a dyn Transcriber,
        config: DialogConfig,
    ) -> Self {
        Self {
            channel,
            interviewer,
            transcriber,
            config,
            start: Instant::now(),
            transcript: Vec::new(),
            last_emma_text: String::new(),
            state: DialogState::AwaitOpen,
        }
    }

    fn set_state(&mut self, state: DialogState) {
        tracing::info!(state = state.label(), "dialog_state_transition");
        self.state = state;
    }

    fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn record(&mut self, speaker: Speaker, text: String) {
        let timestamp = self.elapsed_secs();
        self.transcript.push(TranscriptSegment { speaker, text, timestamp });
    }

    /// Sends one full Emma turn: `emma_speaking`, the text itself, and
    /// (unless suppressed, e.g. the final goodbye) a trailing `listening`.
    async fn emma_turn(&mut self, text: String, trailing_listening: bool) -> Result<()> {
        self.channel
            .send(OutgoingMessage::Control { event: ControlEvent::EmmaSpeaking })
            .await?;
        self.channel
            .send(OutgoingMessage::Text { text: text.clone(), speaker: Speaker::Emma })
            .await?;
        if trailing_listening {
            self.channel
                .send(OutgoingMessage::Control { event: ControlEvent::Listening })
                .await?;
        }
        self.record(Speaker::Emma, text.clone());
        self.last_emma_text = text;
        Ok(())
    }

    /// Waits for one piece of usable candidate text, applying fragment
    /// merging, echo suppression, and audio transcription. Returns `None`
    /// on overall timeout.
    async fn wait_for_human_text(&mut self, base_timeout: Duration, audio_max: Duration) -> Result<Option<String>> {
        let mut deadline = Instant::now() + base_timeout;
        let mut pending: Option<(String, Instant)> = None;
        let mut audio: Option<PendingAudio> = None;

        loop {
            let mut wait_until = deadline;
            if let Some((_, cont_deadline)) = pending {
                wait_until = wait_until.min(cont_deadline);
            }
            let now = Instant::now();
            if now >= wait_until {
                if let Some((text, _)) = pending.take() {
                    return Ok(Some(text));
                }
                return Ok(None);
            }

            let remaining = wait_until - now;
            let received = match tokio::time::timeout(remaining, self.channel.recv()).await {
                Ok(msg) => msg?,
                Err(_elapsed) => {
                    if Instant::now() >= deadline {
                        return Ok(pending.take().map(|(text, _)| text));
                    }
                    if let Some((text, cont_deadline)) = &pending
                        && Instant::now() >= *cont_deadline
                    {
                        return Ok(Some(text.clone()));
                    }
                    continue;
                }
            };

            let Some(message) = received else {
                return Ok(pending.take().map(|(text, _)| text));
            };

            match message {
                IncomingMessage::Text { text } => {
                    let sanitized = sanitize_text(&text);
                    if sanitized.is_empty() || is_echo(&sanitized, &self.last_emma_text) {
                        continue;
                    }
                    let merged = match pending.take() {
                        Some((prev, _)) => merge_fragments(&prev, &sanitized),
                        None => sanitized,
                    };
                    pending = Some((merged, Instant::now() + self.config.fragment_continuation));
                }
                IncomingMessage::AudioStart { codec, sample_rate_hz } => {
                    audio = Some(PendingAudio { chunks: Vec::new(), codec, sample_rate_hz });
                    deadline = deadline.max(Instant::now() + audio_max);
                }
                IncomingMessage::AudioChunk { data_b64, seq: _, is_final } => {
                    let entry = audio.get_or_insert_with(|| PendingAudio {
                        chunks: Vec::new(),
                        codec: String::new(),
                        sample_rate_hz: 0,
                    });
                    deadline = deadline.max(Instant::now() + audio_max);
                    match BASE64.decode(data_b64.as_bytes()) {
                        Ok(bytes) => entry.chunks.push(bytes),
                        Err(e) => {
                            tracing::warn!(error = %e, "audio_chunk_decode_failed");
                        }
                    }
                    if is_final
                        && let Some(text) = self.transcribe_pending(&mut audio).await?
                    {
                        return Ok(Some(text));
                    }
                }
                IncomingMessage::AudioEnd => {
                    if let Some(text) = self.transcribe_pending(&mut audio).await? {
                        return Ok(Some(text));
                    }
                }
            }
        }
    }

    async fn transcribe_pending(&mut self, audio: &mut Option<PendingAudio>) -> Result<Option<String>> {
        let Some(pending) = audio.take() else {
            return Ok(None);
        };
        if pending.chunks.is_empty() {
            return Ok(None);
        }

        let transcribed = self
            .transcriber
            .transcribe(&pending.chunks, &pending.codec, pending.sample_rate_hz)
            .await?;
        let sanitized = sanitize_text(&transcribed);

        if !is_human_text(&sanitized) || is_echo(&sanitized, &self.last_emma_text) {
            return Ok(None);
        }

        Ok(Some(sanitized))
    }

    /// One logical turn: optionally nudges up to `silence_retries` times,
    /// recording each nudge as an Emma segment and resetting the echo
    /// reference, before giving up.
    async fn collect_turn(&mut self, nudge_text: &str, base_timeout: Duration, audio_max: Duration) -> Result<TurnOutcome> {
        for attempt in 0..=self.config.silence_retries {
            if attempt > 0 {
                self.emma_turn(nudge_text.to_string(), true).await?;
            }
            if let Some(text) = self.wait_for_human_text(base_timeout, audio_max).await? {
                return Ok(TurnOutcome::Text(text));
            }
        }
        Ok(TurnOutcome::NoResponse)
    }

    /// Runs greeting, the Q&A loop, and goodbye. Returns the accumulated
    /// transcript for the caller to persist via `end_call`.
    pub async fn run(mut self, prompt: &CallPrompt) -> Result<Vec<TranscriptSegment>> {
        self.set_state(DialogState::GreetingSent);
        let greeting = self.interviewer.greeting(&prompt.role_context).await?;
        self.emma_turn(greeting, true).await?;

        self.set_state(DialogState::AwaitingReady);
        self.collect_turn("Whenever you're ready, just say so.", self.config.ready_base, self.config.ready_max)
            .await?;

        let mut question_index = 0usize;
        'questions: while question_index < prompt.prepared_questions.len() {
            self.set_state(DialogState::AskingQuestion(question_index));
            let Some(question) = self
                .interviewer
                .next_question(question_index, &prompt.prepared_questions, &prompt.role_context)
                .await?
            else {
                break;
            };
            self.emma_turn(question.clone(), true).await?;

            self.set_state(DialogState::AwaitingAnswer(question_index));
            let outcome = self.collect_turn(&question, self.config.answer, self.config.answer).await?;

            match outcome {
                TurnOutcome::NoResponse => {
                    self.record(Speaker::Candidate, NO_RESPONSE.to_string());
                    break 'questions;
                }
                TurnOutcome::Text(answer) => {
                    self.record(Speaker::Candidate, answer.clone());

                    if is_role_question(&answer) {
                        self.set_state(DialogState::OptionalRoleAnswer(question_index));
                        let role_answer = self
                            .interviewer
                            .answer_role_question(&answer, &prompt.role_context)
                            .await?;
                        self.emma_turn(role_answer, true).await?;
                    }
                }
            }

            self.set_state(DialogState::NextOrGoodbye);
            question_index += 1;
        }

        self.set_state(DialogState::Goodbye);
        let goodbye = self.interviewer.goodbye().await?;
        self.emma_turn(goodbye, false).await?;
        self.channel
            .send(OutgoingMessage::Control { event: ControlEvent::CallEnded })
            .await?;

        self.set_state(DialogState::Closed);
        Ok(self.transcript)
    }
}
