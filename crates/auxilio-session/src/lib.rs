//! Session and conversation management for the Auxilio assistant.
//!
//! Owns the current session identifier and the ordered message history,
//! delegates classification of user utterances to the remote backend, and
//! transparently substitutes the local triage classifier on any network
//! failure. Callers never see a raw network error: every `send_message`
//! resolves to a well-formed [`EmergencyResponse`].
//!
//! The manager is an explicit object constructed once at application start
//! and shared by reference; there is no ambient global instance.

mod error;

pub use error::SessionError;
use error::BackendError;

use auxilio_types::wire::{ChatRequest, ChatResponse};
use auxilio_types::{ConversationMessage, EmergencyResponse, MessageRole, UserProfile};
use chrono::Utc;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// Default hard timeout for one backend request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the backend; `/chat` is appended.
    pub base_url: String,
    /// Hard timeout for one backend request. Expiry is treated identically
    /// to any other network failure.
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Mutable session state.
///
/// Guarded by a `std::sync::Mutex`: every critical section is a brief field
/// update that never spans an `.await` point.
#[derive(Debug)]
struct SessionInner {
    session_id: String,
    history: Vec<ConversationMessage>,
    /// Request ID of the outstanding `send_message`, if any.
    in_flight: Option<u64>,
    next_request: u64,
}

/// Owns one emergency conversation at a time.
#[derive(Debug)]
pub struct SessionManager {
    http: reqwest::Client,
    config: SessionConfig,
    inner: Mutex<SessionInner>,
}

impl SessionManager {
    /// Creates a manager with a fresh session.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(SessionError::Client)?;

        Ok(Self {
            http,
            config,
            inner: Mutex::new(SessionInner {
                session_id: new_session_id(),
                history: Vec::new(),
                in_flight: None,
                next_request: 0,
            }),
        })
    }

    /// Sends one user utterance and returns the guidance for it.
    ///
    /// Appends the `user` message before the network attempt, so a backend
    /// failure never loses the user's own words, then appends the `system`
    /// reply, unless the session was reset while the request was in
    /// flight, in which case the stale reply is discarded rather than
    /// applied to the new session's history.
    ///
    /// Exactly one backend request is made, with a hard timeout and no
    /// retry. Any failure (non-2xx, timeout, unreachable host, malformed
    /// body) falls back to the local triage classifier for the same text.
    pub async fn send_message(
        &self,
        text: &str,
        profile: Option<&UserProfile>,
    ) -> Result<EmergencyResponse, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let (issued_session, request_id) = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.in_flight.is_some() {
                return Err(SessionError::RequestInFlight);
            }
            let request_id = inner.next_request;
            inner.next_request += 1;
            inner.in_flight = Some(request_id);
            inner.history.push(new_message(MessageRole::User, text));
            (inner.session_id.clone(), request_id)
        };

        let response = match self.request_backend(text, &issued_session, profile).await {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(
                    session_id = %issued_session,
                    error = %e,
                    "backend request failed, falling back to local triage"
                );
                auxilio_triage::classify(text)
            }
        };

        {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.in_flight == Some(request_id) {
                inner.in_flight = None;
            }
            if inner.session_id == issued_session {
                inner
                    .history
                    .push(new_message(MessageRole::System, &response.response_text));
            } else {
                tracing::info!(
                    stale_session = %issued_session,
                    "discarding in-flight response for a reset session"
                );
            }
        }

        Ok(response)
    }

    /// Discards the history and generates a fresh session identifier.
    ///
    /// Safe to call at any time, including while a request is outstanding:
    /// the stale response is dropped when it arrives. Old identifiers are
    /// never reused.
    pub fn reset_session(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let old = std::mem::replace(&mut inner.session_id, new_session_id());
        inner.history.clear();
        inner.in_flight = None;
        tracing::debug!(old_session = %old, new_session = %inner.session_id, "session reset");
    }

    /// Returns the current session identifier.
    pub fn session_id(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .session_id
            .clone()
    }

    /// Returns a snapshot of the conversation history, oldest first.
    pub fn history(&self) -> Vec<ConversationMessage> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }

    async fn request_backend(
        &self,
        text: &str,
        session_id: &str,
        profile: Option<&UserProfile>,
    ) -> Result<EmergencyResponse, BackendError> {
        let url = format!("{}/chat", self.config.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            text: text.to_string(),
            session_id: session_id.to_string(),
            user_profile: profile.cloned(),
        };

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        let payload: ChatResponse = response.json().await?;
        Ok(payload.into())
    }
}

fn new_session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}

fn new_message(role: MessageRole, text: &str) -> ConversationMessage {
    ConversationMessage {
        id: Uuid::new_v4().to_string(),
        role,
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_prefixed_and_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("session-"));
        assert_ne!(a, b);
    }

    #[test]
    fn reset_always_yields_a_fresh_empty_session() {
        let manager =
            SessionManager::new(SessionConfig::new("http://127.0.0.1:1")).expect("manager");
        let mut seen = vec![manager.session_id()];
        for _ in 0..5 {
            manager.reset_session();
            let id = manager.session_id();
            assert!(!seen.contains(&id), "session id reused: {}", id);
            assert!(manager.history().is_empty());
            seen.push(id);
        }
    }

    #[tokio::test]
    async fn empty_message_is_rejected_without_history_changes() {
        let manager =
            SessionManager::new(SessionConfig::new("http://127.0.0.1:1")).expect("manager");
        let err = manager.send_message("   ", None).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyMessage));
        assert!(manager.history().is_empty());
    }
}
