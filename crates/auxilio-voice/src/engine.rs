//! Platform speech-engine seams.
//!
//! Speech-to-text and text-to-speech are provided by the host platform (a
//! browser API, OS voice services, a sidecar process); this core consumes
//! them through narrow traits and must not assume any particular vendor
//! behind them. Capability is resolved once, at adapter construction.

use crate::error::VoiceError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Whether a platform engine can be used at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

/// One recognition event from the platform engine.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Unstable text; replaces the previous interim segment.
    Interim(String),
    /// Stable text; appended to the accumulated transcript.
    Final(String),
    /// The engine failed. Transient kinds may be retried by the adapter.
    Error(VoiceError),
    /// The engine closed the stream normally.
    Ended,
}

/// A live capture stream opened by [`RecognitionEngine::open`].
#[derive(Debug)]
pub struct RecognitionStream {
    /// Event feed from the engine.
    pub events: mpsc::Receiver<RecognitionEvent>,
    /// Send (or drop) to tell the engine to stop capturing.
    pub stop: oneshot::Sender<()>,
}

/// A speech-to-text platform engine.
pub trait RecognitionEngine: Send + Sync {
    /// Reports whether the platform exposes recognition capability.
    fn availability(&self) -> Availability;

    /// Opens a capture stream for the given BCP 47 locale.
    fn open(&self, locale: &str) -> Result<RecognitionStream, VoiceError>;
}

/// A synthesis voice exposed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `es-ES`.
    pub lang: String,
}

/// Parameters for one synthesis request.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    /// `None` selects the platform default voice.
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// An in-progress playback handed back by [`SynthesisEngine::begin`].
#[derive(Debug)]
pub struct Playback {
    /// Resolves when the utterance finishes; closed without a value when
    /// playback is stopped early.
    pub done: oneshot::Receiver<()>,
    /// Send (or drop) to abort playback immediately.
    pub stop: oneshot::Sender<()>,
}

/// A text-to-speech platform engine.
pub trait SynthesisEngine: Send + Sync {
    /// Lists the voices the platform exposes. May be empty.
    fn voices(&self) -> Vec<Voice>;

    /// Starts rendering an utterance.
    fn begin(&self, utterance: Utterance) -> Result<Playback, VoiceError>;
}

/// A scripted recognition engine for testing purposes.
///
/// Each call to [`RecognitionEngine::open`] replays the next configured
/// event script, spacing events by a fixed gap so interim state is
/// observable, then holds the stream open until the adapter stops it.
pub struct ScriptedRecognitionEngine {
    scripts: Mutex<VecDeque<Vec<RecognitionEvent>>>,
    availability: Availability,
    event_gap: Duration,
}

impl ScriptedRecognitionEngine {
    pub fn new(scripts: Vec<Vec<RecognitionEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            availability: Availability::Available,
            event_gap: Duration::from_millis(10),
        }
    }

    /// An engine that reports no platform capability.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            availability: Availability::Unavailable(reason.into()),
            event_gap: Duration::from_millis(10),
        }
    }

    pub fn with_event_gap(mut self, gap: Duration) -> Self {
        self.event_gap = gap;
        self
    }
}

impl RecognitionEngine for ScriptedRecognitionEngine {
    fn availability(&self) -> Availability {
        self.availability.clone()
    }

    fn open(&self, _locale: &str) -> Result<RecognitionStream, VoiceError> {
        if let Availability::Unavailable(reason) = &self.availability {
            return Err(VoiceError::NotSupported(reason.clone()));
        }

        let script = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let gap = self.event_gap;

        tokio::spawn(async move {
            for event in script {
                tokio::select! {
                    _ = tokio::time::sleep(gap) => {}
                    _ = &mut stop_rx => return,
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            // Script exhausted: hold the stream open until stopped.
            let _ = stop_rx.await;
        });

        Ok(RecognitionStream {
            events: rx,
            stop: stop_tx,
        })
    }
}

/// A scripted synthesis engine for testing purposes.
///
/// Records every utterance it is asked to render and completes each one
/// after a fixed duration unless stopped first.
pub struct ScriptedSynthesisEngine {
    voices: Vec<Voice>,
    utterance_duration: Duration,
    begun: Arc<Mutex<Vec<Utterance>>>,
    completed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSynthesisEngine {
    pub fn new(utterance_duration: Duration) -> Self {
        Self {
            voices: Vec::new(),
            utterance_duration,
            begun: Arc::new(Mutex::new(Vec::new())),
            completed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Every utterance handed to [`SynthesisEngine::begin`], in order.
    pub fn begun(&self) -> Vec<Utterance> {
        self.begun.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts of utterances that played to completion, in order.
    pub fn completed(&self) -> Vec<String> {
        self.completed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SynthesisEngine for ScriptedSynthesisEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn begin(&self, utterance: Utterance) -> Result<Playback, VoiceError> {
        let text = utterance.text.clone();
        self.begun
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(utterance);

        let (done_tx, done_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        let duration = self.utterance_duration;
        let completed = self.completed.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    completed
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .push(text);
                    let _ = done_tx.send(());
                }
                _ = stop_rx => {}
            }
        });

        Ok(Playback {
            done: done_rx,
            stop: stop_tx,
        })
    }
}
