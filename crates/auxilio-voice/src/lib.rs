//! Speech adapters for the Auxilio assistant.
//!
//! Wraps platform speech capability behind two adapters: a recognizer that
//! produces a live transcript with distinct final/interim segments, bounded
//! listening windows, and transient-error retry; and a synthesizer that
//! speaks text with newest-wins replacement, cancellation, and an explicit
//! "utterance finished" event.
//!
//! The platform engines themselves (browser Web Speech API, OS voice
//! services, a sidecar process) live behind the [`engine`] traits and are
//! injected at construction; capability is resolved exactly once, not
//! re-detected at call sites.

pub mod config;
pub mod engine;
pub mod error;
pub mod recognizer;
pub mod synthesizer;

pub use config::VoiceConfig;
pub use engine::{
    Availability, Playback, RecognitionEngine, RecognitionEvent, RecognitionStream,
    ScriptedRecognitionEngine, ScriptedSynthesisEngine, SynthesisEngine, Utterance, Voice,
};
pub use error::VoiceError;
pub use recognizer::{ListenState, SpeechRecognizer};
pub use synthesizer::{Speaking, SpeechSynthesizer};
