//! Wire contract for the `POST /chat` backend endpoint.
//!
//! Backend variants populate the optional response fields inconsistently:
//! some return the full shape, others only `{response}`. Absence of an
//! optional field is data, not an error, so the shape is modeled with
//! explicit `Option` fields and conversion rules rather than truthiness
//! checks.

use crate::{EmergencyResponse, Severity, UserProfile};
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The transcribed user utterance.
    pub text: String,
    /// Opaque session token tying the utterance to one conversation.
    pub session_id: String,
    /// Medical profile forwarded verbatim when the user has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Human-readable guidance text. The only field every variant returns.
    pub response: String,
    /// Step-by-step first-aid actions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    /// Whether the caller should surface the emergency-call affordance.
    #[serde(rename = "shouldCallEmergency", skip_serializing_if = "Option::is_none")]
    pub should_call_emergency: Option<bool>,
    /// Advisory severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl From<ChatResponse> for EmergencyResponse {
    /// Resolves absent optional fields: no instructions means an empty list,
    /// no call flag means `false`, no severity means `Medium` (the severity
    /// of the default triage response).
    fn from(wire: ChatResponse) -> Self {
        Self {
            response_text: wire.response,
            instructions: wire.instructions.unwrap_or_default(),
            severity: wire.severity.unwrap_or(Severity::Medium),
            should_call_emergency: wire.should_call_emergency.unwrap_or(false),
        }
    }
}

impl From<EmergencyResponse> for ChatResponse {
    /// Builds the fully-populated wire shape. Used by backends that speak
    /// the complete contract.
    fn from(response: EmergencyResponse) -> Self {
        Self {
            response: response.response_text,
            instructions: Some(response.instructions),
            should_call_emergency: Some(response.should_call_emergency),
            severity: Some(response.severity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_with_only_text_parses() {
        let wire: ChatResponse =
            serde_json::from_str(r#"{"response":"Mantén la calma"}"#).expect("parse");
        assert_eq!(wire.response, "Mantén la calma");
        assert_eq!(wire.instructions, None);
        assert_eq!(wire.should_call_emergency, None);
        assert_eq!(wire.severity, None);

        let resolved: EmergencyResponse = wire.into();
        assert!(resolved.instructions.is_empty());
        assert_eq!(resolved.severity, Severity::Medium);
        assert!(!resolved.should_call_emergency);
    }

    #[test]
    fn full_response_round_trips() {
        let wire: ChatResponse = serde_json::from_str(
            r#"{
                "response": "EMERGENCIA",
                "instructions": ["Llama al 911", "Aplica presión"],
                "shouldCallEmergency": true,
                "severity": "critical"
            }"#,
        )
        .expect("parse");

        let resolved: EmergencyResponse = wire.clone().into();
        assert_eq!(resolved.instructions.len(), 2);
        assert_eq!(resolved.severity, Severity::Critical);
        assert!(resolved.should_call_emergency);

        let back: ChatResponse = resolved.into();
        assert_eq!(back, wire);
    }

    #[test]
    fn request_omits_absent_profile() {
        let request = ChatRequest {
            text: "me duele el pecho".to_string(),
            session_id: "session-1".to_string(),
            user_profile: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("user_profile").is_none());
    }

    #[test]
    fn request_forwards_profile_when_present() {
        let request = ChatRequest {
            text: "me corté".to_string(),
            session_id: "session-2".to_string(),
            user_profile: Some(UserProfile {
                blood_type: Some("A+".to_string()),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["user_profile"]["bloodType"], "A+");
    }
}
