//! Speech input adapter.
//!
//! A state machine over an injected [`RecognitionEngine`]: `Idle →
//! Listening → Idle`, with distinct final/interim transcripts, a bounded
//! listening window, and automatic retry of transient engine errors.
//!
//! Pending interim text is promoted to the final transcript whenever
//! listening ends without an error (explicit stop, auto-timeout, or natural
//! engine end), so stopping never drops speech the engine had not yet
//! finalized.

use crate::config::VoiceConfig;
use crate::engine::{Availability, RecognitionEngine, RecognitionEvent, RecognitionStream};
use crate::error::VoiceError;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Listening state of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenState {
    #[default]
    Idle,
    Listening,
}

#[derive(Debug, Default)]
struct TranscriptState {
    state: ListenState,
    /// Stable, accumulated transcript (space-joined final segments).
    transcript: String,
    /// Unstable text, replaced on each engine update.
    interim: String,
    /// Last terminal error, if any.
    error: Option<VoiceError>,
    /// Bumped on every `start_listening`; guards against a stale pump task
    /// clobbering the state of a newer listening session.
    generation: u64,
}

/// Speech input adapter over a platform recognition engine.
pub struct SpeechRecognizer {
    engine: Arc<dyn RecognitionEngine>,
    config: VoiceConfig,
    /// Resolved once at construction; call sites never re-detect.
    availability: Availability,
    /// Brief field updates only; never held across an await point.
    inner: Arc<RwLock<TranscriptState>>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl SpeechRecognizer {
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: VoiceConfig) -> Self {
        let availability = engine.availability();
        Self {
            engine,
            config,
            availability,
            inner: Arc::new(RwLock::new(TranscriptState::default())),
            stop_tx: Mutex::new(None),
        }
    }

    /// Whether the platform exposes recognition capability at all.
    pub fn is_supported(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Starts a listening session.
    ///
    /// Fails fast with [`VoiceError::NotSupported`] when the platform has no
    /// capability, and is a no-op when already listening. Clears both
    /// transcripts and the last error on a fresh start.
    pub fn start_listening(&self) -> Result<(), VoiceError> {
        if let Availability::Unavailable(reason) = &self.availability {
            let err = VoiceError::NotSupported(reason.clone());
            self.write_state().error = Some(err.clone());
            return Err(err);
        }

        let generation = {
            let mut state = self.write_state();
            if state.state == ListenState::Listening {
                return Ok(());
            }
            state.state = ListenState::Listening;
            state.transcript.clear();
            state.interim.clear();
            state.error = None;
            state.generation += 1;
            state.generation
        };

        let stream = match self.engine.open(&self.config.locale) {
            Ok(stream) => stream,
            Err(e) => {
                let mut state = self.write_state();
                if state.generation == generation {
                    state.state = ListenState::Idle;
                    state.error = Some(e.clone());
                }
                return Err(e);
            }
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        *self.stop_tx.lock().unwrap_or_else(|e| e.into_inner()) = Some(stop_tx);

        tokio::spawn(pump(
            self.inner.clone(),
            self.engine.clone(),
            self.config.clone(),
            stream,
            stop_rx,
            generation,
        ));

        Ok(())
    }

    /// Stops the current listening session.
    ///
    /// Pending interim text is promoted to the final transcript, so the
    /// accumulated transcript is complete as soon as this returns. Safe to
    /// call when idle.
    pub fn stop_listening(&self) {
        let stop = self.stop_tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(stop) = stop {
            let _ = stop.send(());
        }

        let mut state = self.write_state();
        if state.state == ListenState::Listening {
            promote_interim(&mut state);
            state.state = ListenState::Idle;
        }
    }

    /// Stops listening and clears transcripts and the last error.
    pub fn reset_transcript(&self) {
        self.stop_listening();
        let mut state = self.write_state();
        state.transcript.clear();
        state.interim.clear();
        state.error = None;
    }

    pub fn is_listening(&self) -> bool {
        self.read_state().state == ListenState::Listening
    }

    /// The stable, accumulated transcript.
    pub fn transcript(&self) -> String {
        self.read_state().transcript.clone()
    }

    /// The unstable interim segment, replaced on each engine update.
    pub fn interim_transcript(&self) -> String {
        self.read_state().interim.clone()
    }

    /// The last terminal error, if the previous session ended with one.
    pub fn last_error(&self) -> Option<VoiceError> {
        self.read_state().error.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, TranscriptState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, TranscriptState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Consumes engine events for one listening session.
///
/// Exits on explicit stop, window expiry, a terminal error, or natural
/// engine end. Transient errors reopen the engine stream up to the
/// configured retry bound, with a short backoff between attempts.
async fn pump(
    inner: Arc<RwLock<TranscriptState>>,
    engine: Arc<dyn RecognitionEngine>,
    config: VoiceConfig,
    mut stream: RecognitionStream,
    mut stop_rx: oneshot::Receiver<()>,
    generation: u64,
) {
    let deadline = Instant::now() + config.listen_timeout;
    let mut retries = 0u32;

    loop {
        tokio::select! {
            _ = &mut stop_rx => {
                let _ = stream.stop.send(());
                finish(&inner, generation, None);
                return;
            }
            _ = tokio::time::sleep_until(deadline) => {
                tracing::debug!("listening window expired, auto-stopping");
                let _ = stream.stop.send(());
                finish(&inner, generation, None);
                return;
            }
            event = stream.events.recv() => match event {
                Some(RecognitionEvent::Interim(text)) => {
                    let mut state = inner.write().unwrap_or_else(|e| e.into_inner());
                    if state.generation == generation && state.state == ListenState::Listening {
                        state.interim = text;
                    }
                }
                Some(RecognitionEvent::Final(text)) => {
                    let mut state = inner.write().unwrap_or_else(|e| e.into_inner());
                    if state.generation == generation && state.state == ListenState::Listening {
                        append_final(&mut state, &text);
                        state.interim.clear();
                    }
                }
                Some(RecognitionEvent::Error(err))
                    if err.is_transient() && retries < config.max_retries =>
                {
                    retries += 1;
                    tracing::warn!(attempt = retries, error = %err, "transient recognition error, retrying");
                    tokio::time::sleep(config.retry_backoff).await;
                    match engine.open(&config.locale) {
                        Ok(reopened) => stream = reopened,
                        Err(e) => {
                            finish(&inner, generation, Some(e));
                            return;
                        }
                    }
                }
                Some(RecognitionEvent::Error(err)) => {
                    tracing::warn!(error = %err, "recognition error, stopping");
                    finish(&inner, generation, Some(err));
                    return;
                }
                Some(RecognitionEvent::Ended) | None => {
                    finish(&inner, generation, None);
                    return;
                }
            }
        }
    }
}

/// Transitions to `Idle`. Interim text is promoted on a clean end and
/// discarded on an error end.
fn finish(inner: &Arc<RwLock<TranscriptState>>, generation: u64, error: Option<VoiceError>) {
    let mut state = inner.write().unwrap_or_else(|e| e.into_inner());
    if state.generation != generation {
        return;
    }
    match error {
        None => promote_interim(&mut state),
        Some(err) => {
            state.interim.clear();
            state.error = Some(err);
        }
    }
    state.state = ListenState::Idle;
}

fn promote_interim(state: &mut TranscriptState) {
    if !state.interim.is_empty() {
        let interim = std::mem::take(&mut state.interim);
        append_final(state, &interim);
    }
}

fn append_final(state: &mut TranscriptState, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !state.transcript.is_empty() {
        state.transcript.push(' ');
    }
    state.transcript.push_str(text);
}
