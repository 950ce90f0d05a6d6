//! Error types for the speech adapters.

use thiserror::Error;

/// Errors reported by the speech adapters and their platform engines.
///
/// Each variant is a distinct, user-actionable kind: permission problems
/// get a request-permission affordance, missing capability gets a
/// different-browser hint, no-speech gets a try-again prompt. Only
/// network-class errors are transient and eligible for automatic retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    /// The platform exposes no speech capability.
    #[error("speech capability not supported: {0}")]
    NotSupported(String),

    /// Microphone permission denied. Terminal for the attempt; never
    /// retried automatically.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// The engine heard nothing usable. Terminal for the attempt.
    #[error("no speech detected")]
    NoSpeech,

    /// The microphone could not be captured (missing or busy device).
    #[error("audio capture failed: {0}")]
    AudioCapture(String),

    /// Network-class recognition failure; the recognizer retries these a
    /// bounded number of times.
    #[error("network error during recognition: {0}")]
    Network(String),

    /// Any other engine-reported failure.
    #[error("speech engine error: {0}")]
    Engine(String),
}

impl VoiceError {
    /// Whether the recognizer may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, VoiceError::Network(_))
    }
}
