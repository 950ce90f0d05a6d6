//! Speech output adapter.
//!
//! Speaks text through an injected [`SynthesisEngine`]. The newest request
//! always wins: starting an utterance cancels any in-progress one, and there
//! is no queue. Each started utterance hands back a [`Speaking`] handle
//! whose completion can be awaited, so callers sequence speech with
//! explicit finished events instead of guessing durations from text length.

use crate::config::VoiceConfig;
use crate::engine::{SynthesisEngine, Utterance, Voice};
use crate::error::VoiceError;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Handle for one started utterance.
#[derive(Debug)]
pub struct Speaking {
    done: oneshot::Receiver<()>,
}

impl Speaking {
    /// Waits until the utterance has finished playing or been cancelled.
    pub async fn finished(self) {
        let _ = self.done.await;
    }
}

struct ActiveUtterance {
    id: u64,
    stop: oneshot::Sender<()>,
}

#[derive(Default)]
struct SynthInner {
    next_utterance: u64,
    active: Option<ActiveUtterance>,
}

/// Speech output adapter over a platform synthesis engine.
pub struct SpeechSynthesizer {
    engine: Arc<dyn SynthesisEngine>,
    config: VoiceConfig,
    /// Voice matching the configured locale, selected once at construction.
    /// `None` falls back to the platform default; that is not an error.
    preferred_voice: Option<Voice>,
    /// Brief field updates only; never held across an await point.
    inner: Arc<Mutex<SynthInner>>,
}

impl SpeechSynthesizer {
    pub fn new(engine: Arc<dyn SynthesisEngine>, config: VoiceConfig) -> Self {
        let preferred_voice = select_voice(&engine.voices(), &config.locale);
        if preferred_voice.is_none() {
            tracing::debug!(
                locale = %config.locale,
                "no voice matches the configured locale, using platform default"
            );
        }
        Self {
            engine,
            config,
            preferred_voice,
            inner: Arc::new(Mutex::new(SynthInner::default())),
        }
    }

    /// The voice that will be requested for utterances, if any matched.
    pub fn preferred_voice(&self) -> Option<&Voice> {
        self.preferred_voice.as_ref()
    }

    /// Starts speaking `text`, cancelling any in-progress utterance first.
    pub fn speak(&self, text: &str) -> Result<Speaking, VoiceError> {
        self.cancel();

        let playback = self.engine.begin(Utterance {
            text: text.to_string(),
            voice: self.preferred_voice.clone(),
            rate: self.config.rate,
            pitch: self.config.pitch,
            volume: self.config.volume,
        })?;

        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let id = inner.next_utterance;
            inner.next_utterance += 1;
            inner.active = Some(ActiveUtterance {
                id,
                stop: playback.stop,
            });
            id
        };

        let (done_tx, done_rx) = oneshot::channel();
        let inner = self.inner.clone();
        let engine_done = playback.done;
        tokio::spawn(async move {
            // Resolves on completion or, with a closed channel, on cancel.
            let _ = engine_done.await;
            let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.active.as_ref().is_some_and(|active| active.id == id) {
                inner.active = None;
            }
            drop(inner);
            let _ = done_tx.send(());
        });

        Ok(Speaking { done: done_rx })
    }

    /// Stops any in-progress utterance immediately. Idempotent.
    pub fn cancel(&self) {
        let active = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active
            .take();
        if let Some(active) = active {
            let _ = active.stop.send(());
        }
    }

    /// Whether an utterance is currently playing.
    pub fn is_speaking(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .active
            .is_some()
    }
}

/// Picks the first voice whose language matches the locale's primary
/// subtag (`es-ES` prefers any `es*` voice).
fn select_voice(voices: &[Voice], locale: &str) -> Option<Voice> {
    let primary = locale.split('-').next().unwrap_or(locale).to_lowercase();
    if primary.is_empty() {
        return None;
    }
    voices
        .iter()
        .find(|voice| voice.lang.to_lowercase().starts_with(&primary))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> Voice {
        Voice {
            name: name.to_string(),
            lang: lang.to_string(),
        }
    }

    #[test]
    fn prefers_voice_matching_locale_primary_subtag() {
        let voices = vec![voice("English", "en-US"), voice("Español", "es-MX")];
        let selected = select_voice(&voices, "es-ES").expect("voice");
        assert_eq!(selected.lang, "es-MX");
    }

    #[test]
    fn no_matching_voice_is_not_an_error() {
        let voices = vec![voice("English", "en-US")];
        assert_eq!(select_voice(&voices, "es-ES"), None);
        assert_eq!(select_voice(&[], "es-ES"), None);
    }

    #[test]
    fn voice_matching_is_case_insensitive() {
        let voices = vec![voice("Español", "ES-es")];
        assert!(select_voice(&voices, "es-ES").is_some());
    }
}
