//! End-to-end tests for the guided conversation flow, with scripted speech
//! engines, a recording dialer, and an unreachable backend (so every
//! classification exercises the local triage fallback).

use auxilio_assist::{AssistConfig, Assistant, Dialer, TurnOutcome};
use auxilio_session::{SessionConfig, SessionManager};
use auxilio_types::Severity;
use auxilio_voice::{
    RecognitionEvent, ScriptedRecognitionEngine, ScriptedSynthesisEngine, SpeechRecognizer,
    SpeechSynthesizer, VoiceConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records dialed numbers instead of placing calls.
#[derive(Default)]
struct RecordingDialer {
    calls: Mutex<Vec<String>>,
}

impl RecordingDialer {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Dialer for RecordingDialer {
    fn dial(&self, number: &str) -> Result<(), String> {
        self.calls.lock().expect("calls lock").push(number.to_string());
        Ok(())
    }
}

struct Harness {
    assistant: Assistant,
    session: Arc<SessionManager>,
    recognizer: Arc<SpeechRecognizer>,
    synthesis: Arc<ScriptedSynthesisEngine>,
    dialer: Arc<RecordingDialer>,
}

fn harness(scripts: Vec<Vec<RecognitionEvent>>) -> Harness {
    // Nothing listens on this port: the session manager always falls back
    // to the local classifier.
    let session = Arc::new(
        SessionManager::new(
            SessionConfig::new("http://127.0.0.1:9")
                .with_request_timeout(Duration::from_millis(150)),
        )
        .expect("session manager"),
    );

    let recognizer = Arc::new(SpeechRecognizer::new(
        Arc::new(ScriptedRecognitionEngine::new(scripts)),
        VoiceConfig::default(),
    ));
    let synthesis = Arc::new(ScriptedSynthesisEngine::new(Duration::from_millis(10)));
    let synthesizer = Arc::new(SpeechSynthesizer::new(
        synthesis.clone(),
        VoiceConfig::default(),
    ));
    let dialer = Arc::new(RecordingDialer::default());

    let assistant = Assistant::new(
        session.clone(),
        recognizer.clone(),
        synthesizer,
        Some(dialer.clone()),
        AssistConfig::default(),
    );

    Harness {
        assistant,
        session,
        recognizer,
        synthesis,
        dialer,
    }
}

#[tokio::test]
async fn critical_emergency_speaks_guidance_then_dials() {
    let h = harness(vec![vec![RecognitionEvent::Final(
        "mi hijo se está asfixiando".to_string(),
    )]]);

    h.assistant.start_conversation().await.expect("start failed");
    assert!(h.recognizer.is_listening());

    // Let the scripted utterance arrive before completing the turn.
    tokio::time::sleep(Duration::from_millis(80)).await;

    let outcome = h
        .assistant
        .complete_utterance(None)
        .await
        .expect("turn failed");

    let (response, dialed) = match outcome {
        TurnOutcome::Responded { response, dialed } => (response, dialed),
        other => panic!("expected a response, got {:?}", other),
    };
    assert_eq!(response.severity, Severity::Critical);
    assert!(dialed);
    assert_eq!(h.dialer.calls(), vec!["911".to_string()]);

    // Spoken sequence: greeting, response, instructions, calling notice.
    // Each completes before the next begins; the dial happens after the
    // notice.
    let spoken = h.synthesis.completed();
    assert_eq!(spoken.len(), 4);
    assert!(spoken[0].contains("Describe tu emergencia"));
    assert_eq!(spoken[1], response.response_text);
    assert!(spoken[2].starts_with("Instrucciones:"));
    assert!(spoken[2].contains("Heimlich"));
    assert!(spoken[3].contains("Llamando a emergencias"));

    // History carries the utterance and the system reply, in that order.
    let history = h.session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text, "mi hijo se está asfixiando");
}

#[tokio::test]
async fn low_severity_response_does_not_dial() {
    let h = harness(vec![vec![RecognitionEvent::Final(
        "me quemé con agua caliente".to_string(),
    )]]);

    h.assistant.start_conversation().await.expect("start failed");
    tokio::time::sleep(Duration::from_millis(80)).await;

    let outcome = h
        .assistant
        .complete_utterance(None)
        .await
        .expect("turn failed");

    match outcome {
        TurnOutcome::Responded { response, dialed } => {
            assert_eq!(response.severity, Severity::Low);
            assert!(!dialed);
        }
        other => panic!("expected a response, got {:?}", other),
    }

    assert!(h.dialer.calls().is_empty());
    let spoken = h.synthesis.completed();
    assert!(
        !spoken.iter().any(|s| s.contains("Llamando a emergencias")),
        "calling notice must not be spoken for a low-severity response"
    );
}

#[tokio::test]
async fn empty_transcript_prompts_repeat_and_keeps_listening() {
    // First listening session hears nothing; the second hears the real
    // utterance after the retry prompt.
    let h = harness(vec![
        vec![],
        vec![RecognitionEvent::Final("me corté la mano".to_string())],
    ]);

    h.assistant.start_conversation().await.expect("start failed");
    tokio::time::sleep(Duration::from_millis(40)).await;

    let outcome = h
        .assistant
        .complete_utterance(None)
        .await
        .expect("turn failed");
    assert!(matches!(outcome, TurnOutcome::NothingHeard));
    assert!(h.recognizer.is_listening(), "must be listening again");
    assert!(h
        .synthesis
        .completed()
        .iter()
        .any(|s| s.contains("No se detectó ningún texto")));

    // Nothing was sent: the input error is recovered, never escalated.
    assert!(h.session.history().is_empty());

    tokio::time::sleep(Duration::from_millis(80)).await;
    let outcome = h
        .assistant
        .complete_utterance(None)
        .await
        .expect("second turn failed");
    assert!(matches!(outcome, TurnOutcome::Responded { .. }));
    assert_eq!(h.session.history().len(), 2);
}

#[tokio::test]
async fn start_conversation_resets_the_session() {
    let h = harness(vec![
        vec![RecognitionEvent::Final("tengo una astilla".to_string())],
        vec![],
    ]);

    h.assistant.start_conversation().await.expect("start failed");
    tokio::time::sleep(Duration::from_millis(80)).await;
    h.assistant
        .complete_utterance(None)
        .await
        .expect("turn failed");

    let first_session = h.session.session_id();
    assert_eq!(h.session.history().len(), 2);

    h.assistant
        .start_conversation()
        .await
        .expect("restart failed");
    assert_ne!(h.session.session_id(), first_session);
    assert!(h.session.history().is_empty());
}
