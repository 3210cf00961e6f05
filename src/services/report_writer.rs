//! 阅卷报告写入服务 - 业务能力层
//!
//! 只负责"把一份答卷的阅卷结果追加到报告文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::error::{AppResult, FileError};
use crate::models::evaluation::EvaluationReport;

/// 阅卷报告写入服务
pub struct ReportWriter {
    report_file_path: String,
}

impl ReportWriter {
    /// 使用指定的报告文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            report_file_path: path.into(),
        }
    }

    /// 追加一份答卷的阅卷结果
    ///
    /// # 参数
    /// - `submission_name`: 答卷名称
    /// - `transcript`: LLM 原始阅卷文本
    /// - `report`: 解析后的阅卷结果
    ///
    /// 未能解析出任何题目时，原样写入阅卷文本。
    pub fn write(
        &self,
        submission_name: &str,
        transcript: &str,
        report: &EvaluationReport,
    ) -> AppResult<()> {
        debug!(
            "写入阅卷报告: {} | 题目数: {}",
            submission_name, report.summary.question_count
        );

        let body = if report.is_structured() {
            report.to_string()
        } else {
            format!("(未能解析出逐题结果，以下为原始阅卷文本)\n{}\n", transcript.trim())
        };
        let entry = format!("### {}\n{}\n{}\n\n", submission_name, body, "-".repeat(60));

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_file_path)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .map_err(|source| FileError::WriteFailed {
                path: self.report_file_path.clone(),
                source,
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate_transcript;

    #[test]
    fn test_structured_report_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let writer = ReportWriter::with_path(path.to_string_lossy());

        let transcript = "Question: Q1\nScore: 1/2\nFeedback: ok";
        writer
            .write("Alice", transcript, &evaluate_transcript(transcript))
            .unwrap();
        writer
            .write("Bob", transcript, &evaluate_transcript(transcript))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("### Alice\nTotal Score: 1/2 | Percentage: 50% | Questions: 1"));
        assert!(content.contains("### Bob"));
    }

    #[test]
    fn test_unstructured_report_keeps_raw_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let writer = ReportWriter::with_path(path.to_string_lossy());

        let transcript = "The student scored well overall.";
        writer
            .write("Carol", transcript, &evaluate_transcript(transcript))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("The student scored well overall."));
        assert!(!content.contains("Total Score"));
    }
}
