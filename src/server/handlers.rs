//! HTTP 接口处理函数

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use tracing::{debug, info};

use crate::error::{AppError, ExtractionError, LlmError};
use crate::models::evaluation::EvaluationReport;
use crate::models::progress::UserProgress;
use crate::models::session::{SessionType, StudySession};
use crate::models::submission::mime_from_path;
use crate::server::response::{HttpError, HttpResult};
use crate::server::AppState;
use crate::services::{CompletionOptions, PromptMessage, UploadedFile};
use crate::workflow::title_from_message;

// ========== 阅卷 ==========

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluateRequest {
    pub question_paper: Option<String>,
    pub answer_key: Option<String>,
    pub student_answers: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    /// LLM 原始阅卷文本
    pub evaluation: String,
    pub report: EvaluationReport,
}

pub async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> HttpResult<Json<EvaluateResponse>> {
    let run = state
        .evaluation_flow
        .run(
            req.question_paper.as_deref().unwrap_or_default(),
            req.answer_key.as_deref().unwrap_or_default(),
            req.student_answers.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| match e {
            AppError::Llm(LlmError::EmptyContent { .. }) => {
                HttpError::internal("No evaluation received from AI")
            }
            other => HttpError::from(other),
        })?;

    Ok(Json(EvaluateResponse {
        evaluation: run.transcript,
        report: run.report,
    }))
}

// ========== 文件识别 ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessFileResponse {
    pub text: String,
}

pub async fn process_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> HttpResult<Json<ProcessFileResponse>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = match field.content_type() {
            Some(content_type) if content_type != "application/octet-stream" => {
                content_type.to_string()
            }
            _ => mime_from_path(FsPath::new(&file_name)).to_string(),
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.body_text()))?;

        upload = Some(UploadedFile {
            file_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = upload.ok_or_else(|| HttpError::from(AppError::from(ExtractionError::NoFile)))?;
    info!("📎 收到文件: {} ({})", file.file_name, file.mime_type);

    let text = state.evaluation_flow.text_extractor().extract_text(file).await?;
    Ok(Json(ProcessFileResponse { text }))
}

// ========== 对话转发 ==========

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<PromptMessage>>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub stream: bool,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> HttpResult<Response> {
    if !state.llm_service.is_configured() {
        return Err(AppError::from(LlmError::MissingApiKey).into());
    }

    let messages = req
        .messages
        .filter(|messages| !messages.is_empty())
        .ok_or_else(|| HttpError::bad_request("Messages array is required"))?;

    let options = CompletionOptions {
        temperature: req.temperature,
        max_tokens: req.max_tokens,
        top_p: None,
    };
    debug!("对话请求: {} 条消息, stream={}", messages.len(), req.stream);

    if !req.stream {
        let response = state.llm_service.chat(&messages, options).await?;
        return Ok(Json(response).into_response());
    }

    let chunks = state.llm_service.chat_stream(&messages, options).await?;
    let events = chunks
        .map(|chunk| match chunk {
            Ok(chunk) => Event::default().json_data(chunk),
            Err(e) => Ok(Event::default().event("error").data(e.to_string())),
        })
        .chain(stream::once(async { Ok(Event::default().data("[DONE]")) }));

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

// ========== 学习会话 ==========

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateSessionRequest {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub first_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> HttpResult<(StatusCode, Json<StudySession>)> {
    let first_message = req
        .first_message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let title = match (req.title.as_deref().map(str::trim), first_message) {
        (Some(title), _) if !title.is_empty() => title.to_string(),
        (_, Some(message)) => title_from_message(message),
        _ => req.session_type.title().to_string(),
    };

    let flow = &state.tutor_flow;
    let mut session = flow.start_session(
        req.session_type,
        &title,
        req.subject.as_deref().unwrap_or_default(),
    )?;

    if let Some(message) = first_message {
        session = flow.ask(&session.id, message).await?;
    }

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn list_sessions(State(state): State<AppState>) -> HttpResult<Json<Vec<StudySession>>> {
    Ok(Json(state.tutor_flow.store().list_sessions()?))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<Json<StudySession>> {
    state
        .tutor_flow
        .store()
        .get_session(&id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Session not found: {}", id)).into())
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HttpResult<StatusCode> {
    if state.tutor_flow.store().delete_session(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Session not found: {}", id)).into())
    }
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> HttpResult<Json<StudySession>> {
    Ok(Json(state.tutor_flow.ask(&id, &req.content).await?))
}

pub async fn get_progress(State(state): State<AppState>) -> HttpResult<Json<UserProgress>> {
    Ok(Json(state.tutor_flow.store().get_progress()?))
}
