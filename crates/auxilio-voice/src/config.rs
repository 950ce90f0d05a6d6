//! Tuning parameters for the speech adapters.

use std::time::Duration;

/// Default locale requested from the engines.
pub const DEFAULT_LOCALE: &str = "es-ES";

/// Default cap on one continuous listening window.
const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(20);

/// Default bound on transient-error retries.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before reopening the engine after a transient error.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Configuration shared by the recognizer and the synthesizer.
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// BCP 47 locale requested from the recognition engine and preferred
    /// when selecting a synthesis voice.
    pub locale: String,
    /// Hard cap on one continuous listening window; the recognizer
    /// auto-stops when it expires.
    pub listen_timeout: Duration,
    /// Bounded number of automatic retries for transient recognition
    /// errors.
    pub max_retries: u32,
    /// Delay before reopening the engine stream after a transient error.
    pub retry_backoff: Duration,
    /// Speech rate multiplier (1.0 is normal).
    pub rate: f32,
    /// Pitch shift factor (1.0 is normal).
    pub pitch: f32,
    /// Playback volume (0.0–1.0).
    pub volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}
