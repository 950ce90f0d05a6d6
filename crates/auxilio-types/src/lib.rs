//! Shared types and constants for the Auxilio platform.
//!
//! This crate provides the foundational types used across all Auxilio crates:
//! the structured emergency response produced by triage, conversation
//! messages and roles, the user medical profile, and the `/chat` wire
//! contract spoken between the session manager and the backend.
//!
//! No crate in the workspace depends on anything *except* `auxilio-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Advisory severity of a classified emergency.
///
/// Severity drives presentation (color coding, prominence) only; it never
/// gates control flow. Ordering reflects escalation: `Low < Medium < High <
/// Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Self-care territory; medical attention only if it worsens.
    Low,
    /// Needs attention, not immediately life-threatening.
    Medium,
    /// Urgent medical attention required.
    High,
    /// Immediately life-threatening.
    Critical,
}

impl Severity {
    /// Returns the wire label for this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Author role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A transcribed user utterance.
    User,
    /// A response produced by the backend or the local triage fallback.
    System,
}

/// Structured first-aid guidance for one utterance.
///
/// Immutable once constructed. `should_call_emergency` is advisory: it
/// signals the caller to surface (or trigger) a call affordance, it never
/// places a call by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyResponse {
    /// Human-readable guidance to speak and display.
    pub response_text: String,
    /// Step-by-step actions, in order. May be empty.
    pub instructions: Vec<String>,
    /// Advisory severity, drives UI color only.
    pub severity: Severity,
    /// Advisory flag for the emergency-call affordance.
    pub should_call_emergency: bool,
}

/// One entry in a session's ordered, append-only conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message ID (UUID v4). Insertion order is significant.
    pub id: String,
    /// Who authored the message.
    pub role: MessageRole,
    /// Message text.
    pub text: String,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Externally-owned user medical profile.
///
/// Persisted by a collaborator outside this core; the core only reads it and
/// forwards it with backend requests. All fields are optional and omitted
/// from wire JSON when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
}

pub mod wire;
pub use wire::{ChatRequest, ChatResponse};
