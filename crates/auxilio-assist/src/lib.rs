//! Guided emergency conversation flow.
//!
//! Sequences greeting → listening → triage → spoken guidance → dialer for
//! one emergency conversation. Every step waits on the synthesizer's
//! explicit "utterance finished" event; nothing in this crate sequences
//! speech with wall-clock timers or text-length estimates.

use auxilio_session::{SessionError, SessionManager};
use auxilio_types::{EmergencyResponse, UserProfile};
use auxilio_voice::{SpeechRecognizer, SpeechSynthesizer, VoiceError};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the assistant flow.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("voice error: {0}")]
    Voice(#[from] VoiceError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("dialer error: {0}")]
    Dialer(String),
}

/// The `tel:` capability boundary.
///
/// Injected by the host platform; absent where no dialer exists. Dialing is
/// only ever triggered after the calling notice has finished playing.
pub trait Dialer: Send + Sync {
    fn dial(&self, number: &str) -> Result<(), String>;
}

/// Outcome of completing one utterance.
#[derive(Debug)]
pub enum TurnOutcome {
    /// Nothing usable was heard. The assistant asked the user to repeat and
    /// is already listening again.
    NothingHeard,
    /// Guidance was produced and spoken; `dialed` reports whether the
    /// emergency dialer was invoked.
    Responded {
        response: EmergencyResponse,
        dialed: bool,
    },
}

/// Spoken prompts and dialing configuration for the flow.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// Number handed to the dialer when a response requests a call.
    pub emergency_number: String,
    /// Spoken when a conversation starts.
    pub greeting: String,
    /// Spoken when an utterance produced no usable text.
    pub repeat_prompt: String,
    /// Spoken immediately before invoking the dialer.
    pub calling_notice: String,
    /// Prefix for the spoken instruction list.
    pub instructions_prefix: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            emergency_number: "911".to_string(),
            greeting: "Describe tu emergencia. Explica claramente qué está pasando para poder ayudarte mejor.".to_string(),
            repeat_prompt: "No se detectó ningún texto. Inténtalo de nuevo.".to_string(),
            calling_notice: "Llamando a emergencias automáticamente. Mantén la calma, la ayuda está en camino.".to_string(),
            instructions_prefix: "Instrucciones".to_string(),
        }
    }
}

/// Drives one emergency conversation over the session manager and the two
/// speech adapters.
pub struct Assistant {
    session: Arc<SessionManager>,
    recognizer: Arc<SpeechRecognizer>,
    synthesizer: Arc<SpeechSynthesizer>,
    dialer: Option<Arc<dyn Dialer>>,
    config: AssistConfig,
}

impl Assistant {
    pub fn new(
        session: Arc<SessionManager>,
        recognizer: Arc<SpeechRecognizer>,
        synthesizer: Arc<SpeechSynthesizer>,
        dialer: Option<Arc<dyn Dialer>>,
        config: AssistConfig,
    ) -> Self {
        Self {
            session,
            recognizer,
            synthesizer,
            dialer,
            config,
        }
    }

    /// Begins a fresh conversation: cancels any speech, resets the session,
    /// speaks the greeting to completion, then starts listening.
    pub async fn start_conversation(&self) -> Result<(), AssistError> {
        self.synthesizer.cancel();
        self.recognizer.reset_transcript();
        self.session.reset_session();
        tracing::info!(session_id = %self.session.session_id(), "starting emergency conversation");

        self.synthesizer.speak(&self.config.greeting)?.finished().await;
        self.recognizer.start_listening()?;
        Ok(())
    }

    /// Finishes the current utterance: stops listening, classifies what was
    /// heard, and speaks the guidance.
    ///
    /// An empty transcript is recovered locally: the repeat prompt is
    /// spoken and listening restarts. Otherwise the response text is spoken
    /// to completion, then the instructions (when present), and finally,
    /// when the response requests it, the calling notice followed by the
    /// dialer.
    pub async fn complete_utterance(
        &self,
        profile: Option<&UserProfile>,
    ) -> Result<TurnOutcome, AssistError> {
        self.recognizer.stop_listening();
        let transcript = self.recognizer.transcript();
        self.recognizer.reset_transcript();

        let heard = transcript.trim();
        if heard.is_empty() {
            tracing::debug!("empty transcript, prompting user to repeat");
            self.synthesizer
                .speak(&self.config.repeat_prompt)?
                .finished()
                .await;
            self.recognizer.start_listening()?;
            return Ok(TurnOutcome::NothingHeard);
        }

        let response = self.session.send_message(heard, profile).await?;
        self.synthesizer
            .speak(&response.response_text)?
            .finished()
            .await;

        if !response.instructions.is_empty() {
            let spoken = format!(
                "{}: {}",
                self.config.instructions_prefix,
                response.instructions.join(". ")
            );
            self.synthesizer.speak(&spoken)?.finished().await;
        }

        let mut dialed = false;
        if response.should_call_emergency {
            self.synthesizer
                .speak(&self.config.calling_notice)?
                .finished()
                .await;
            if let Some(dialer) = &self.dialer {
                dialer
                    .dial(&self.config.emergency_number)
                    .map_err(AssistError::Dialer)?;
                dialed = true;
                tracing::info!(number = %self.config.emergency_number, "emergency dialer invoked");
            }
        }

        Ok(TurnOutcome::Responded { response, dialed })
    }

    /// Ends the conversation without producing a response.
    pub fn abort(&self) {
        self.synthesizer.cancel();
        self.recognizer.reset_transcript();
        self.session.reset_session();
    }
}
