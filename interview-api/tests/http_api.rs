//! Requests driven through the full router, including extractors and CORS.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use interview_api::app;
use interview_api::config::ServerConfig;
use interview_api::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "resume-boundary";

fn state() -> AppState {
    AppState::in_memory(ServerConfig::default()).expect("state")
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

fn resume_upload(field: &str, text: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"cv.txt\"\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         {text}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::post("/v1/resumes")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

fn ingest_form(body: &'static str) -> Request<Body> {
    Request::post("/v1/hr/ingest")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn health_answers_with_cors_headers() {
    let state = state();
    let request = Request::get("/v1/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .expect("request");
    let response = app(state).oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn uploaded_resume_is_matched_against_posted_jd() {
    let state = state();

    let (status, uploaded) = send(&state, resume_upload("file", "Python rust axum")).await;
    assert_eq!(status, StatusCode::OK);
    let resume_id = uploaded["resume_id"].as_str().expect("resume_id").to_string();
    let stored = state.resumes.get(&resume_id).expect("stored resume");
    assert_eq!(stored.name.as_deref(), Some("cv.txt"));
    assert_eq!(stored.text, "Python rust axum");

    let jd = json!({ "jd_text": "rust, axum" });
    let (status, posted) = send(&state, post_json("/v1/jds", &jd)).await;
    assert_eq!(status, StatusCode::OK);
    let jd_id = posted["jd_id"].as_str().expect("jd_id");

    let (status, report) = send(
        &state,
        post_json("/v1/match", &json!({ "resume_id": resume_id, "jd_id": jd_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Two shared terms out of three and two: 2 / sqrt(6).
    let score = report["score"].as_f64().expect("score");
    assert!((score - 2.0 / 6f64.sqrt()).abs() < 1e-9, "score {score}");
    assert_eq!(report["gaps"], json!(["kubernetes", "aws"]));
    assert_eq!(report["skills"][0]["name"], "python");
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let state = state();
    let (status, _) = send(&state, resume_upload("attachment", "text")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn match_with_unknown_ids_scores_zero() {
    let state = state();
    let (status, report) = send(
        &state,
        post_json("/v1/match", &json!({ "resume_id": "nope", "jd_id": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["score"], json!(0.0));
}

#[tokio::test]
async fn hr_ingest_reads_url_encoded_form() {
    let state = state();
    let (status, report) = send(&state, ingest_form("transcript=Um%2C+I+enjoy+teams")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["transcript"], "Um, I enjoy teams");
    assert_eq!(report["metrics"]["words_per_min_approx"], 60);
    assert_eq!(report["metrics"]["filler_ratio_approx"], json!(0.15));
    assert_eq!(report["metrics"]["sentiment_approx"], "positive");

    let (status, report) = send(&state, ingest_form("")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["transcript"], "");
    assert_eq!(report["metrics"]["sentiment_approx"], "neutral");
}

#[tokio::test]
async fn proctor_flags_follow_posted_events() {
    let state = state();
    let session = json!({ "type": "technical" });
    let (status, created) = send(&state, post_json("/v1/sessions", &session)).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = created["session_id"].as_str().expect("session_id").to_string();

    for (kind, meta) in [
        ("tab_blur", json!({ "ms": 900 })),
        ("tab_blur", Value::Null),
        ("webcam_off", Value::Null),
    ] {
        let (status, body) = send(
            &state,
            post_json(
                "/v1/proctor/events",
                &json!({ "session_id": session_id, "type": kind, "meta": meta }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    let uri = format!("/v1/proctor/flags?session_id={session_id}");
    let (status, flags) = send(&state, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flags["hard_flag"], true);
    assert_eq!(flags["soft_flag_count"], 2);
    let events = flags["events"].as_array().expect("events");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["type"], "tab_blur");
    assert_eq!(events[0]["meta"]["ms"], 900);

    let (status, flags) = send(&state, get("/v1/proctor/flags?session_id=unknown")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flags["hard_flag"], false);
    assert_eq!(flags["events"], json!([]));
}

#[tokio::test]
async fn proctor_flags_require_session_id() {
    let state = state();
    let (status, _) = send(&state, get("/v1/proctor/flags")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_exchange_rejects_blank_token() {
    let state = state();
    let (status, _) = send(&state, post_json("/v1/auth/exchange", &json!({ "token": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let token = json!({ "token": "google-id" });
    let (status, body) = send(&state, post_json("/v1/auth/exchange", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["jwt"].as_str().expect("jwt").starts_with("mock-"));
    assert_eq!(body["user"]["email"], "mockuser@gmail.com");
}
