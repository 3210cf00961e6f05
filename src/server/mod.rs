//! HTTP 服务
//!
//! 把阅卷、文件识别、对话转发和学习会话以 JSON 接口的形式提供出来。

pub mod handlers;
pub mod response;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::services::LlmService;
use crate::store::{self, SessionStore};
use crate::workflow::{EvaluationFlow, TutorFlow};

pub use response::{HttpError, HttpResult};

/// 各接口共享的状态
#[derive(Clone)]
pub struct AppState {
    pub llm_service: LlmService,
    pub evaluation_flow: EvaluationFlow,
    pub tutor_flow: TutorFlow,
    pub upload_limit_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Self {
        let llm_service = LlmService::new(config);
        Self {
            evaluation_flow: EvaluationFlow::new(config),
            tutor_flow: TutorFlow::new(store, llm_service.clone()),
            llm_service,
            upload_limit_bytes: config.upload_limit_bytes,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let upload_limit = state.upload_limit_bytes;

    Router::new()
        .route("/api/evaluate", post(handlers::evaluate))
        .route("/api/process-file", post(handlers::process_file))
        .route("/api/chat", post(handlers::chat))
        .route(
            "/api/sessions",
            post(handlers::create_session).get(handlers::list_sessions),
        )
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/{id}/messages", post(handlers::send_message))
        .route("/api/progress", get(handlers::get_progress))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 启动 HTTP 服务，直到进程退出
pub async fn serve(config: Config) -> AppResult<()> {
    let addr: SocketAddr = config
        .server_addr
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name: "SERVER_ADDR".to_string(),
            value: config.server_addr.clone(),
        })?;

    if !config.has_llm_credentials() {
        warn!("⚠️ 未配置 LLM_API_KEY，阅卷与对话接口将返回 500");
    }

    let store = store::open_store(&config)?;
    let app = router(AppState::new(&config, store));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ConfigError::BindFailed {
            addr: addr.to_string(),
            source,
        })?;
    info!("🌐 HTTP 服务已启动: http://{}", addr);
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Other(format!("HTTP 服务异常退出: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompts;
    use crate::store::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "paper-checker-boundary";

    fn app_with(config: Config) -> Router {
        router(AppState::new(&config, Arc::new(MemoryStore::new())))
    }

    fn app() -> Router {
        app_with(Config::default())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(field: &str, file_name: &str, content_type: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\nbytes\r\n--{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/process-file")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_evaluate_requires_all_fields() {
        let (status, body) = send(
            app(),
            json_request("POST", "/api/evaluate", json!({ "questionPaper": "Q1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Question paper, answer key, and student answers are required"
        );
    }

    #[tokio::test]
    async fn test_evaluate_without_key() {
        let (status, body) = send(
            app(),
            json_request(
                "POST",
                "/api/evaluate",
                json!({ "questionPaper": "Q1", "answerKey": "A1", "studentAnswers": "S1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "LLM API key not configured");
    }

    #[tokio::test]
    async fn test_chat_checks_key_then_messages() {
        let (status, body) = send(app(), json_request("POST", "/api/chat", json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "LLM API key not configured");

        let configured = app_with(Config {
            llm_api_key: "test-key".to_string(),
            ..Config::default()
        });
        let (status, body) = send(
            configured,
            json_request("POST", "/api/chat", json!({ "messages": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Messages array is required");
    }

    #[tokio::test]
    async fn test_process_file_variants() {
        let (status, body) = send(app(), multipart_request("other", "a.png", "image/png")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");

        let (status, body) =
            send(app(), multipart_request("file", "notes.txt", "text/plain")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Unsupported file type. Please upload images (PNG, JPG) or PDFs."
        );

        let (status, body) = send(
            app(),
            multipart_request("file", "paper.pdf", "application/octet-stream"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], prompts::PDF_GUIDANCE);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app();

        let (status, created) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/sessions",
                json!({ "type": "language", "subject": "Spanish", "firstMessage": "How do I conjugate ser?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["type"], "language");
        assert_eq!(created["title"], "How do I conjugate ser?");
        assert_eq!(created["messages"].as_array().unwrap().len(), 2);
        assert_eq!(created["messages"][1]["content"], prompts::TUTOR_APOLOGY);

        let id = created["id"].as_str().unwrap().to_string();

        let (status, listed) = send(
            app.clone(),
            Request::get("/api/sessions").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            app.clone(),
            json_request(
                "POST",
                &format!("/api/sessions/{}/messages", id),
                json!({ "content": "And estar?" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["messages"].as_array().unwrap().len(), 4);

        let (status, progress) = send(
            app.clone(),
            Request::get("/api/progress").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progress["totalSessions"], 1);
        assert_eq!(progress["totalMessages"], 4);

        let (status, _) = send(
            app.clone(),
            Request::delete(format!("/api/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(
            app,
            Request::get(format!("/api/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&id));
    }

    #[tokio::test]
    async fn test_session_title_falls_back_to_mode_title() {
        let (status, created) = send(
            app(),
            json_request("POST", "/api/sessions", json!({ "type": "code-mentor" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Code Mentor");
        assert_eq!(created["subject"], "General");
    }

    #[tokio::test]
    async fn test_port_in_use_is_reported_with_address() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let config = Config {
            server_addr: addr.clone(),
            ..Config::default()
        };
        let err = serve(config).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::BindFailed { .. })
        ));
        assert!(err.to_string().contains(&addr));
    }

    #[tokio::test]
    async fn test_invalid_server_addr() {
        let config = Config {
            server_addr: "not an address".to_string(),
            ..Config::default()
        };
        let err = serve(config).await.unwrap_err();
        assert!(err.to_string().contains("SERVER_ADDR"));
    }
}
