//! Deterministic keyword triage for emergency descriptions.
//!
//! Maps a free-text (possibly garbled speech-to-text) description of a
//! medical emergency to a structured [`EmergencyResponse`]: guidance text,
//! ordered first-aid instructions, an advisory severity, and a call flag.
//!
//! This is the reference behavior the remote backend is expected to
//! approximate, and the fallback used when the backend is unreachable.
//! Classification is a total function: no I/O, no allocation failures worth
//! naming, bounded time, and a fixed default response for input that matches
//! nothing.

mod rules;

use auxilio_types::EmergencyResponse;
use rules::{Tier, DEFAULT_TIER, RULES};

/// Classifies a free-text emergency description.
///
/// Matching is case-insensitive substring containment against an ordered
/// rule table; the first matching rule wins, and within a two-tiered rule
/// the first matching severity tier wins. Input that matches no rule yields
/// the fixed default response (`Medium` severity, generic triage steps, no
/// call flag).
pub fn classify(description: &str) -> EmergencyResponse {
    let normalized = description.to_lowercase();
    for rule in RULES {
        if rule.matches(&normalized) {
            return build_response(rule.tier_for(&normalized));
        }
    }
    build_response(&DEFAULT_TIER)
}

/// Returns the name of the first rule matching `description`, or `None`
/// when the default response applies. Useful for logging and diagnostics.
pub fn matched_rule(description: &str) -> Option<&'static str> {
    let normalized = description.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&normalized))
        .map(|rule| rule.name)
}

fn build_response(tier: &Tier) -> EmergencyResponse {
    EmergencyResponse {
        response_text: tier.response.to_string(),
        instructions: tier.instructions.iter().map(|s| s.to_string()).collect(),
        severity: tier.severity,
        should_call_emergency: tier.call_emergency,
    }
}
