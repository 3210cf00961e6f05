use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 学习会话类型（辅导模式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    /// 自适应辅导
    #[default]
    Tutor,
    /// 编程导师
    CodeMentor,
    /// 测验生成
    Assessment,
    /// 语言学习
    Language,
    /// 学习伙伴
    StudyCompanion,
}

impl SessionType {
    /// 全部会话类型
    pub const ALL: [SessionType; 5] = [
        SessionType::Tutor,
        SessionType::CodeMentor,
        SessionType::Assessment,
        SessionType::Language,
        SessionType::StudyCompanion,
    ];

    /// 接口中使用的标识
    pub fn code(self) -> &'static str {
        match self {
            SessionType::Tutor => "tutor",
            SessionType::CodeMentor => "code-mentor",
            SessionType::Assessment => "assessment",
            SessionType::Language => "language",
            SessionType::StudyCompanion => "study-companion",
        }
    }

    /// 展示名称
    pub fn title(self) -> &'static str {
        match self {
            SessionType::Tutor => "Adaptive Learning Tutor",
            SessionType::CodeMentor => "Code Mentor",
            SessionType::Assessment => "Assessment Creator",
            SessionType::Language => "Language Learning",
            SessionType::StudyCompanion => "Study Companion",
        }
    }

    /// 从标识解析会话类型
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 会话中的一条消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<SessionType>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, context: Option<SessionType>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            context,
        }
    }
}

/// 一次学习会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

impl StudySession {
    pub fn new(session_type: SessionType, title: impl Into<String>, subject: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            subject: subject.into(),
            messages: Vec::new(),
            created_at: now,
            last_activity: now,
            session_type,
        }
    }

    /// 追加消息并刷新最近活跃时间
    pub fn push_message(&mut self, message: ChatMessage) {
        self.last_activity = message.timestamp;
        self.messages.push(message);
    }
}
