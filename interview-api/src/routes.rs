//! HTTP route handlers for the interview API.

use axum::Router;
use axum::extract::{Form, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use judge::ExecutionRequest;
use judge::core::report::SubmissionReport;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::bank::{McqPrompt, ProblemSummary};
use crate::hr::{self, IngestReport};
use crate::matching::{self, MatchReport};
use crate::proctor::{self, ProctorEvent, ProctorFlags};
use crate::session::{self, CodingAttempt, Feedback, McqNext, McqSubmission, Session};
use crate::state::{AppState, Document};
use crate::store::generate_id;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/exchange", post(auth_exchange))
        .route("/profile", get(get_profile).post(save_profile))
        .route("/resumes", post(upload_resume))
        .route("/jds", post(post_jd))
        .route("/match", post(match_resume))
        .route("/questions/generate", post(generate_questions))
        .route("/sessions", post(create_session))
        .route("/mcq/next", post(mcq_next))
        .route("/mcq/submit", post(mcq_submit))
        .route("/code/run", post(code_run))
        .route("/hr/ask", post(hr_ask))
        .route("/hr/ingest", post(hr_ingest))
        .route("/proctor/events", post(proctor_event))
        .route("/proctor/flags", get(proctor_flags))
        .route("/feedback/finalize", post(feedback_finalize))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct ExchangeRequest {
    token: String,
}

/// POST /v1/auth/exchange - mock token exchange; any non-blank token is accepted.
async fn auth_exchange(Json(req): Json<ExchangeRequest>) -> Result<Json<Value>, StatusCode> {
    if req.token.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(json!({
        "jwt": format!("mock-{}", generate_id()),
        "user": { "id": generate_id(), "email": "mockuser@gmail.com" },
    })))
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: String,
}

async fn save_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(profile): Json<Value>,
) -> Json<Value> {
    state.profiles.put(&query.user_id, profile.clone());
    Json(json!({ "ok": true, "profile": profile }))
}

async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, StatusCode> {
    state
        .profiles
        .get(&query.user_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// POST /v1/resumes - multipart upload, field `file`.
async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let resume_id = generate_id();
        info!(resume_id = %resume_id, bytes = bytes.len(), "resume stored");
        state.resumes.put(&resume_id, Document { name, text });
        return Ok(Json(json!({ "resume_id": resume_id })));
    }
    Err(StatusCode::BAD_REQUEST)
}

#[derive(Deserialize)]
struct JdRequest {
    jd_text: String,
}

async fn post_jd(State(state): State<AppState>, Json(req): Json<JdRequest>) -> Json<Value> {
    let jd_id = generate_id();
    state.jds.put(
        &jd_id,
        Document {
            name: None,
            text: req.jd_text,
        },
    );
    Json(json!({ "jd_id": jd_id }))
}

#[derive(Deserialize)]
struct MatchRequest {
    resume_id: String,
    jd_id: String,
}

/// POST /v1/match - unknown ids match as empty text.
async fn match_resume(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Json<MatchReport> {
    let resume = state.resumes.get(&req.resume_id).map(|d| d.text);
    let jd = state.jds.get(&req.jd_id).map(|d| d.text);
    Json(matching::match_texts(
        resume.as_deref().unwrap_or_default(),
        jd.as_deref().unwrap_or_default(),
    ))
}

#[derive(Serialize)]
struct GeneratedQuestions {
    mcqs: Vec<McqPrompt>,
    coding: Vec<ProblemSummary>,
}

async fn generate_questions(State(state): State<AppState>) -> Json<GeneratedQuestions> {
    Json(GeneratedQuestions {
        mcqs: state.bank.mcq_prompts(),
        coding: state.bank.problem_summaries(),
    })
}

#[derive(Deserialize)]
struct SessionRequest {
    #[serde(rename = "type")]
    kind: String,
}

async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<SessionRequest>,
) -> Json<Value> {
    let session_id = generate_id();
    state.sessions.put(&session_id, Session::new(req.kind));
    state.proctor_events.put(&session_id, Vec::new());
    info!(session_id = %session_id, "session created");
    Json(json!({ "session_id": session_id }))
}

#[derive(Deserialize)]
struct SessionQuery {
    session_id: String,
}

async fn mcq_next(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<McqNext> {
    let session = state.sessions.get(&query.session_id);
    Json(session::next_question(session.as_ref(), &state.bank))
}

#[derive(Deserialize)]
struct McqSubmitRequest {
    session_id: String,
    question_id: String,
    selected_index: usize,
}

async fn mcq_submit(
    State(state): State<AppState>,
    Json(req): Json<McqSubmitRequest>,
) -> Json<McqSubmission> {
    let mut graded = None;
    state.sessions.update(&req.session_id, &mut |session| {
        graded = Some(session::submit_answer(
            session,
            &state.bank,
            &req.question_id,
            req.selected_index,
        ));
    });
    Json(graded.unwrap_or_else(McqSubmission::unknown_session))
}

#[derive(Deserialize)]
struct CodeRunRequest {
    problem_id: String,
    lang: String,
    code: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// POST /v1/code/run - judge a submission against the problem's hidden tests.
async fn code_run(
    State(state): State<AppState>,
    Json(req): Json<CodeRunRequest>,
) -> Result<Json<SubmissionReport>, StatusCode> {
    let Some(harness) = state.dispatcher.harness(&req.lang) else {
        return Ok(Json(SubmissionReport::rejected(format!(
            "unsupported language: {}",
            req.lang
        ))));
    };
    let problem = state.bank.problem(&req.problem_id).ok_or(StatusCode::NOT_FOUND)?;
    let declared = problem.tests.len();
    let request = ExecutionRequest::new(req.code, problem.tests.clone()).map_err(|err| {
        error!(err = %format!("{err:#}"), "invalid execution request");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let outcome = state.dispatcher.run(harness, request).await.map_err(|err| {
        error!(
            problem_id = %req.problem_id,
            err = %format!("{err:#}"),
            "judge failed"
        );
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let report = outcome.into_report(declared);

    if let Some(session_id) = &req.session_id {
        let attempt = CodingAttempt {
            problem_id: req.problem_id.clone(),
            passed: report.passed,
            total: report.total,
        };
        state
            .sessions
            .update(session_id, &mut |session| session.record_coding(attempt.clone()));
    }
    Ok(Json(report))
}

async fn hr_ask(State(state): State<AppState>, Query(query): Query<SessionQuery>) -> Json<Value> {
    let count = state
        .proctor_events
        .get(&query.session_id)
        .map_or(0, |events| events.len());
    Json(json!({ "question": hr::question_for(count) }))
}

#[derive(Deserialize)]
struct IngestForm {
    transcript: Option<String>,
}

async fn hr_ingest(Form(form): Form<IngestForm>) -> Json<IngestReport> {
    Json(hr::ingest(form.transcript))
}

#[derive(Deserialize)]
struct ProctorEventRequest {
    session_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    meta: Option<Value>,
}

async fn proctor_event(
    State(state): State<AppState>,
    Json(req): Json<ProctorEventRequest>,
) -> Json<Value> {
    let event = ProctorEvent::now(req.kind, req.meta);
    let appended = state
        .proctor_events
        .update(&req.session_id, &mut |events| events.push(event.clone()));
    if !appended {
        state.proctor_events.put(&req.session_id, vec![event]);
    }
    Json(json!({ "ok": true }))
}

async fn proctor_flags(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<ProctorFlags> {
    let events = state.proctor_events.get(&query.session_id).unwrap_or_default();
    Json(proctor::flags(events))
}

#[derive(Deserialize)]
struct FeedbackRequest {
    session_id: String,
}

async fn feedback_finalize(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Json<Feedback> {
    let session = state.sessions.get(&req.session_id);
    Json(session::feedback(session.as_ref()))
}
