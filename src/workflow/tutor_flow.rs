//! 辅导对话流程 - 流程层
//!
//! 负责学习会话的创建与问答，会话和进度通过注入的 `SessionStore` 读写。

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::progress::{Achievement, UserProgress};
use crate::models::session::{ChatMessage, Role, SessionType, StudySession};
use crate::services::{prompts, CompletionOptions, LlmService, PromptMessage};
use crate::store::SessionStore;

/// 默认科目
pub const DEFAULT_SUBJECT: &str = "General";

/// 带入提示词的历史消息条数
const HISTORY_WINDOW: usize = 6;

/// 标题最多保留的字符数
const TITLE_MAX_CHARS: usize = 50;

/// 根据第一条消息生成会话标题
pub fn title_from_message(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() > TITLE_MAX_CHARS {
        let head: String = message.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

#[derive(Clone)]
pub struct TutorFlow {
    store: Arc<dyn SessionStore>,
    llm_service: LlmService,
}

impl TutorFlow {
    pub fn new(store: Arc<dyn SessionStore>, llm_service: LlmService) -> Self {
        Self { store, llm_service }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// 创建新会话并更新学习进度
    pub fn start_session(
        &self,
        session_type: SessionType,
        title: &str,
        subject: &str,
    ) -> AppResult<StudySession> {
        let subject = if subject.trim().is_empty() {
            DEFAULT_SUBJECT
        } else {
            subject.trim()
        };
        let session = StudySession::new(session_type, title.trim(), subject);
        self.store.put_session(session.clone())?;

        self.update_progress(|progress| progress.record_session(subject))?;
        info!("📚 新会话 [{}] {} ({})", session_type, session.title, subject);

        Ok(session)
    }

    /// 向会话提问：记录提问，调用辅导模型，记录回复
    ///
    /// 模型调用失败时写入致歉回复，会话本身仍然返回。
    /// 每条消息都在存储的写锁内追加，调用模型期间会话被删除则返回 `NotFound`。
    pub async fn ask(&self, session_id: &str, content: &str) -> AppResult<StudySession> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::validation("Message content is required"));
        }

        let mut prompt = None;
        let mut context = None;
        let question = ChatMessage::new(Role::User, content, None);
        self.store
            .update_session(session_id, &mut |session: &mut StudySession| {
                prompt = Some(build_prompt(session, content));
                context = Some(session.session_type);
                let mut message = question.clone();
                message.context = context;
                session.push_message(message);
            })?
            .ok_or_else(|| session_not_found(session_id))?;
        self.update_progress(UserProgress::record_message)?;

        let messages = match prompt {
            Some(messages) => messages?,
            None => return Err(session_not_found(session_id)),
        };
        let reply = match self
            .llm_service
            .chat_text(&messages, CompletionOptions::chat())
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("辅导模型调用失败: {}", e);
                prompts::TUTOR_APOLOGY.to_string()
            }
        };

        let answer = ChatMessage::new(Role::Assistant, reply, context);
        let session = self
            .store
            .update_session(session_id, &mut |session: &mut StudySession| {
                session.push_message(answer.clone())
            })?
            .ok_or_else(|| session_not_found(session_id))?;
        self.update_progress(UserProgress::record_message)?;

        Ok(session)
    }

    /// 修改学习进度：记录当天活动并解锁成就
    fn update_progress(&self, change: impl Fn(&mut UserProgress)) -> AppResult<Vec<Achievement>> {
        let now = Utc::now();
        let mut unlocked = Vec::new();
        self.store
            .update_progress(&mut |progress: &mut UserProgress| {
                change(progress);
                progress.record_activity(now.date_naive());
                unlocked = progress.unlock_achievements(now);
            })?;

        for achievement in &unlocked {
            info!("🏆 解锁成就: {} {}", achievement.icon, achievement.title);
        }
        Ok(unlocked)
    }
}

fn session_not_found(id: &str) -> AppError {
    AppError::not_found(format!("Session not found: {}", id))
}

/// 组装辅导提示词：系统消息（模式上下文 + 最近对话）+ 本次提问
fn build_prompt(session: &StudySession, content: &str) -> AppResult<Vec<PromptMessage>> {
    let start = session.messages.len().saturating_sub(HISTORY_WINDOW);
    let history: Vec<PromptMessage> = session.messages[start..]
        .iter()
        .map(|m| PromptMessage::new(m.role, m.content.clone()))
        .collect();
    let additional = format!("Previous conversation: {}", serde_json::to_string(&history)?);

    Ok(vec![
        PromptMessage::new(
            Role::System,
            prompts::build_tutor_system_message(
                prompts::educational_context(session.session_type),
                Some(&additional),
            ),
        ),
        PromptMessage::new(Role::User, content),
    ])
}
