//! Error types for the session manager.

use thiserror::Error;

/// Contract and setup errors surfaced by [`crate::SessionManager`].
///
/// Backend failures are deliberately absent: any network-layer problem is
/// absorbed into a locally-synthesized fallback response and never reaches
/// the caller as an error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The utterance was empty or whitespace. Recovered by prompting the
    /// user to repeat; never escalates.
    #[error("message text is empty")]
    EmptyMessage,

    /// A request for this session is already outstanding. Guards against
    /// duplicate history entries for the same logical utterance.
    #[error("a message is already in flight for this session")]
    RequestInFlight,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Internal backend failure classification, used for logging before the
/// fallback path takes over.
#[derive(Debug, Error)]
pub(crate) enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
}
