use crate::infra::{AppState, FormState, SessionId};
use crate::views::render_page;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use topsis_form::error::AppError;
use topsis_form::footer::Footer;
use topsis_form::form::{FormFields, PendingSubmission, SubmitError, UploadFile};
use topsis_form::submission::SubmissionFailure;
use tracing::{info, warn};

pub(crate) fn form_router(state: FormState) -> Router {
    Router::new()
        .route("/", get(new_session))
        .route("/sessions/:session_id", get(show_form))
        .route("/sessions/:session_id/submit", post(submit_form))
        .route("/sessions/:session_id/send-mail", post(toggle_send_mail))
        .route("/sessions/:session_id/reset", post(reset_form))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// The native form as posted: field values plus the send-mail toggle button, if pressed.
#[derive(Debug, Default)]
pub(crate) struct PostedForm {
    pub(crate) fields: FormFields,
    pub(crate) toggle_send_mail: Option<bool>,
}

pub(crate) async fn read_posted_form(mut multipart: Multipart) -> Result<PostedForm, AppError> {
    let mut posted = PostedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            let upload = UploadFile::new(file_name, content_type, bytes.to_vec());
            posted.fields.file = (!upload.is_blank()).then_some(upload);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| AppError::BadRequest(err.to_string()))?;
        match name.as_str() {
            "weights" => posted.fields.weights = value,
            "impacts" => posted.fields.impacts = value,
            "email" => posted.fields.email = value,
            "send_mail" => posted.fields.send_mail = parse_flag(&value),
            "toggle_send_mail" => posted.toggle_send_mail = Some(parse_flag(&value)),
            _ => {}
        }
    }

    Ok(posted)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1"
    )
}

fn session_not_found(session_id: SessionId) -> AppError {
    AppError::NotFound(format!("session {session_id}"))
}

fn session_path(session_id: SessionId) -> String {
    format!("/sessions/{session_id}")
}

fn render(
    state: &FormState,
    session_id: SessionId,
    notice: Option<&str>,
) -> Result<Html<String>, AppError> {
    let footer = Footer::current(&state.footer);
    state
        .sessions
        .with_session(session_id, |form| {
            Html(render_page(session_id, form, &footer, notice))
        })
        .ok_or_else(|| session_not_found(session_id))
}

pub(crate) async fn new_session(State(state): State<FormState>) -> Redirect {
    let session_id = state.sessions.create();
    info!(session_id, "form session created");
    Redirect::to(&session_path(session_id))
}

pub(crate) async fn show_form(
    State(state): State<FormState>,
    Path(session_id): Path<SessionId>,
) -> Result<Html<String>, AppError> {
    render(&state, session_id, None)
}

pub(crate) async fn submit_form(
    State(state): State<FormState>,
    Path(session_id): Path<SessionId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let PostedForm { mut fields, .. } = read_posted_form(multipart).await?;

    let started = state
        .sessions
        .with_session(session_id, |form| {
            // The browser cannot re-send a file it was handed back, so keep the last one.
            if fields.file.is_none() {
                fields.file = form.fields().file.clone();
            }
            form.on_submit(fields)
        })
        .ok_or_else(|| session_not_found(session_id))?;

    match started {
        Ok(PendingSubmission { token, payload }) => {
            // Scoring runs detached so the session settles even if the client disconnects.
            let task_state = state.clone();
            let scoring = tokio::spawn(async move {
                let outcome = task_state.backend.score(payload).await;
                task_state
                    .sessions
                    .with_session(session_id, |form| form.complete(token, outcome))
            });

            let settled = match scoring.await {
                Ok(settled) => settled,
                Err(err) => {
                    warn!(session_id, error = %err, "scoring task aborted");
                    state.sessions.with_session(session_id, |form| {
                        form.complete(token, Err(SubmissionFailure::fallback()))
                    })
                }
            };
            settled.ok_or_else(|| session_not_found(session_id))?;
            Ok(render(&state, session_id, None)?.into_response())
        }
        Err(err @ SubmitError::Invalid(_)) => {
            let notice = err.to_string();
            let page = render(&state, session_id, Some(&notice))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(SubmitError::InFlight) => {
            let page = render(&state, session_id, None)?;
            Ok((StatusCode::CONFLICT, page).into_response())
        }
    }
}

pub(crate) async fn toggle_send_mail(
    State(state): State<FormState>,
    Path(session_id): Path<SessionId>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let PostedForm {
        fields,
        toggle_send_mail,
    } = read_posted_form(multipart).await?;
    let checked = toggle_send_mail.unwrap_or(!fields.send_mail);

    state
        .sessions
        .with_session(session_id, |form| {
            form.set_weights(fields.weights);
            form.set_impacts(fields.impacts);
            form.set_email(fields.email);
            if fields.file.is_some() {
                form.set_file(fields.file);
            }
            form.on_toggle_send_mail(checked);
        })
        .ok_or_else(|| session_not_found(session_id))?;

    Ok(Redirect::to(&session_path(session_id)))
}

pub(crate) async fn reset_form(
    State(state): State<FormState>,
    Path(session_id): Path<SessionId>,
) -> Result<Redirect, AppError> {
    state
        .sessions
        .with_session(session_id, |form| form.on_reset())
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Redirect::to(&session_path(session_id)))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
