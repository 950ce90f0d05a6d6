//! Integration tests for the session manager against a real HTTP backend.
//!
//! Each test spins up a scenario-specific axum backend on an ephemeral port,
//! exercising the success path, every failure class that must resolve to the
//! local triage fallback, the stale-response rule, and the in-flight guard.

use auxilio_session::{SessionConfig, SessionManager, SessionError};
use auxilio_types::{MessageRole, Severity, UserProfile};
use axum::{routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Starts the given router on an ephemeral port and returns its address.
async fn start_backend(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let addr = listener.local_addr().expect("failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    addr
}

fn manager_for(addr: SocketAddr) -> SessionManager {
    SessionManager::new(
        SessionConfig::new(format!("http://{}", addr))
            .with_request_timeout(Duration::from_millis(500)),
    )
    .expect("failed to build session manager")
}

#[tokio::test]
async fn successful_send_appends_user_then_system() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            Json(json!({
                "response": "Posible fractura detectada.",
                "instructions": ["No mover la zona afectada"],
                "shouldCallEmergency": true,
                "severity": "high"
            }))
        }),
    );
    let manager = manager_for(start_backend(app).await);

    let response = manager
        .send_message("creo que me rompí el brazo", None)
        .await
        .expect("send failed");

    assert_eq!(response.severity, Severity::High);
    assert!(response.should_call_emergency);
    assert_eq!(response.instructions.len(), 1);

    let history = manager.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].text, "creo que me rompí el brazo");
    assert_eq!(history[1].role, MessageRole::System);
    assert_eq!(history[1].text, "Posible fractura detectada.");
}

#[tokio::test]
async fn text_only_response_resolves_absent_fields() {
    let app = Router::new().route(
        "/chat",
        post(|| async { Json(json!({"response": "¿Puedes dar más detalles?"})) }),
    );
    let manager = manager_for(start_backend(app).await);

    let response = manager
        .send_message("no sé qué pasa", None)
        .await
        .expect("send failed");

    assert_eq!(response.response_text, "¿Puedes dar más detalles?");
    assert!(response.instructions.is_empty());
    assert_eq!(response.severity, Severity::Medium);
    assert!(!response.should_call_emergency);
}

#[tokio::test]
async fn unreachable_backend_falls_back_to_local_triage() {
    // Nothing listens on this port; the connect fails immediately.
    let manager = SessionManager::new(
        SessionConfig::new("http://127.0.0.1:9")
            .with_request_timeout(Duration::from_millis(200)),
    )
    .expect("failed to build session manager");

    let text = "mi hijo se está asfixiando";
    let response = manager.send_message(text, None).await.expect("send failed");

    assert_eq!(response, auxilio_triage::classify(text));
    assert_eq!(response.severity, Severity::Critical);

    // The user's own message is never lost to a backend failure.
    let history = manager.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].text, text);
    assert_eq!(history[1].text, response.response_text);
}

#[tokio::test]
async fn backend_error_status_falls_back_to_local_triage() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "triage engine offline",
            )
        }),
    );
    let manager = manager_for(start_backend(app).await);

    let text = "me quemé con agua caliente";
    let response = manager.send_message(text, None).await.expect("send failed");
    assert_eq!(response, auxilio_triage::classify(text));
    assert_eq!(response.severity, Severity::Low);
}

#[tokio::test]
async fn malformed_body_falls_back_to_local_triage() {
    let app = Router::new().route("/chat", post(|| async { "this is not json" }));
    let manager = manager_for(start_backend(app).await);

    let text = "tengo una astilla en el dedo";
    let response = manager.send_message(text, None).await.expect("send failed");
    assert_eq!(response, auxilio_triage::classify(text));
}

#[tokio::test]
async fn timeout_is_treated_as_any_other_failure() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"response": "too late"}))
        }),
    );
    let addr = start_backend(app).await;
    let manager = SessionManager::new(
        SessionConfig::new(format!("http://{}", addr))
            .with_request_timeout(Duration::from_millis(150)),
    )
    .expect("failed to build session manager");

    let text = "hay mucha sangre";
    let response = manager.send_message(text, None).await.expect("send failed");
    assert_eq!(response, auxilio_triage::classify(text));
    assert_eq!(manager.history().len(), 2);
}

#[tokio::test]
async fn stale_response_after_reset_is_discarded() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({"response": "respuesta tardía"}))
        }),
    );
    let manager = Arc::new(manager_for(start_backend(app).await));

    let sender = manager.clone();
    let pending = tokio::spawn(async move {
        sender.send_message("me corté la mano", None).await
    });

    // Reset mid-flight; the new session must never see the old reply.
    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.reset_session();
    let new_session = manager.session_id();

    let response = pending
        .await
        .expect("task panicked")
        .expect("send failed");
    assert_eq!(response.response_text, "respuesta tardía");

    assert_eq!(manager.session_id(), new_session);
    assert!(
        manager.history().is_empty(),
        "stale response must not be applied to the new session's history"
    );
}

#[tokio::test]
async fn second_send_while_in_flight_is_rejected() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            Json(json!({"response": "listo"}))
        }),
    );
    let manager = Arc::new(manager_for(start_backend(app).await));

    let sender = manager.clone();
    let pending = tokio::spawn(async move {
        sender.send_message("no puedo mover la pierna", None).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let err = manager
        .send_message("otro mensaje", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::RequestInFlight));

    pending
        .await
        .expect("task panicked")
        .expect("first send failed");

    // The guard clears once the outstanding request resolves.
    manager
        .send_message("ahora sí", None)
        .await
        .expect("send after completion failed");
    assert_eq!(manager.history().len(), 4);
}

#[tokio::test]
async fn session_id_and_profile_are_forwarded() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let capture = seen.clone();
    let app = Router::new().route(
        "/chat",
        post(move |Json(body): Json<Value>| {
            let capture = capture.clone();
            async move {
                *capture.lock().expect("capture lock") = Some(body);
                Json(json!({"response": "recibido"}))
            }
        }),
    );
    let manager = manager_for(start_backend(app).await);
    let session_id = manager.session_id();

    let profile = UserProfile {
        full_name: Some("Ana Pérez".to_string()),
        blood_type: Some("O-".to_string()),
        allergies: vec!["penicilina".to_string()],
        emergency_contact: None,
    };
    manager
        .send_message("me duele la cabeza", Some(&profile))
        .await
        .expect("send failed");

    let body = seen
        .lock()
        .expect("capture lock")
        .clone()
        .expect("backend never saw the request");
    assert_eq!(body["text"], "me duele la cabeza");
    assert_eq!(body["session_id"], session_id);
    assert_eq!(body["user_profile"]["fullName"], "Ana Pérez");
    assert_eq!(body["user_profile"]["allergies"][0], "penicilina");
}
