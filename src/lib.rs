//! # Paper Checker
//!
//! 基于 LLM 的试卷批改与学习辅导服务
//!
//! ## 架构设计
//!
//! ### ① 纯函数层（Evaluation）
//! - `evaluation/` - 阅卷文本解析，不做任何 I/O
//! - `segment` - 把阅卷文本切分为逐题记录
//! - `aggregate` - 汇总得分与百分比
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LlmService` - 阅卷、图片识别、辅导对话
//! - `ImageHost` - 上传图片拿到公网 URL
//! - `TextExtractor` - 文件 → 文字
//! - `ReportWriter` - 写阅卷报告
//!
//! ### ③ 流程层（Workflow）
//! - `EvaluationFlow` - 一份答卷的阅卷流程（识别 → 阅卷 → 解析）
//! - `TutorFlow` - 学习会话问答，读写 `store::SessionStore`
//!
//! ### ④ 编排层 / 接口层
//! - `orchestrator/` - 批量阅卷，管理并发
//! - `server/` - HTTP 接口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod orchestrator;
pub mod server;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use evaluation::{aggregate, evaluate_transcript, segment};
pub use models::{EvaluationReport, EvaluationSummary, QuestionRecord, Submission};
pub use orchestrator::App;
pub use workflow::{EvaluationFlow, TutorFlow};
