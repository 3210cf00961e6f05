//! 阅卷流程 - 流程层
//!
//! 核心职责：定义"一份答卷"的完整阅卷流程
//!
//! 流程顺序：
//! 1. 解析三个来源（试卷、答案、学生作答）为文字
//! 2. LLM 阅卷，得到原始阅卷文本
//! 3. 解析阅卷文本，汇总得分

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::evaluation::evaluate_transcript;
use crate::models::evaluation::EvaluationReport;
use crate::models::submission::{mime_from_path, Source, Submission};
use crate::services::{ImageHost, LlmService, TextExtractor, UploadedFile};
use crate::utils::truncate_text;

/// 三项输入缺失时的提示
pub const MISSING_INPUTS: &str = "Question paper, answer key, and student answers are required";

/// 一次阅卷的结果：原始文本 + 解析结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRun {
    pub transcript: String,
    pub report: EvaluationReport,
}

/// 阅卷流程
///
/// - 不持有会话状态
/// - 只依赖业务能力（services）
#[derive(Clone)]
pub struct EvaluationFlow {
    llm_service: LlmService,
    text_extractor: TextExtractor,
}

impl EvaluationFlow {
    /// 根据配置创建阅卷流程
    pub fn new(config: &Config) -> Self {
        let llm_service = LlmService::new(config);
        let text_extractor = TextExtractor::new(ImageHost::new(config), llm_service.clone());
        Self::from_services(llm_service, text_extractor)
    }

    pub fn from_services(llm_service: LlmService, text_extractor: TextExtractor) -> Self {
        Self {
            llm_service,
            text_extractor,
        }
    }

    pub fn text_extractor(&self) -> &TextExtractor {
        &self.text_extractor
    }

    /// 对已经是文字的三项输入阅卷
    pub async fn run(
        &self,
        question_paper: &str,
        answer_key: &str,
        student_answers: &str,
    ) -> AppResult<EvaluationRun> {
        if [question_paper, answer_key, student_answers]
            .iter()
            .any(|input| input.trim().is_empty())
        {
            return Err(AppError::validation(MISSING_INPUTS));
        }

        info!(
            "📝 开始阅卷，学生作答预览: {}",
            truncate_text(student_answers.trim(), 40)
        );

        let transcript = self
            .llm_service
            .grade(question_paper, answer_key, student_answers)
            .await?;
        let report = evaluate_transcript(&transcript);

        if report.is_structured() {
            info!("✓ 阅卷完成: {}", report.summary);
        } else {
            info!("⚠️ 阅卷文本未能解析出逐题结果，将保留原始文本");
        }

        Ok(EvaluationRun { transcript, report })
    }

    /// 对一份 TOML 答卷阅卷（先把文件来源识别成文字）
    pub async fn run_submission(&self, submission: &Submission) -> AppResult<EvaluationRun> {
        let base_dir = submission.base_dir();

        let question_paper = self.resolve_source(&submission.question_paper, &base_dir).await?;
        let answer_key = self.resolve_source(&submission.answer_key, &base_dir).await?;
        let student_answers = self.resolve_source(&submission.student_answers, &base_dir).await?;

        self.run(&question_paper, &answer_key, &student_answers).await
    }

    /// 把一个来源转换为文字
    async fn resolve_source(&self, source: &Source, base_dir: &Path) -> AppResult<String> {
        if let Source::Text { text } = source {
            return Ok(text.clone());
        }

        let mut files = Vec::new();
        for path in source.resolved_files(base_dir) {
            files.push(read_upload(&path).await?);
        }
        debug!("识别 {} 个文件", files.len());

        self.text_extractor.extract_many(files).await
    }
}

async fn read_upload(path: &Path) -> AppResult<UploadedFile> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::File(FileError::NotFound {
                path: path.display().to_string(),
            })
        } else {
            AppError::file_read_failed(path.display().to_string(), e)
        }
    })?;

    Ok(UploadedFile {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        mime_type: mime_from_path(path).to_string(),
        bytes,
    })
}
