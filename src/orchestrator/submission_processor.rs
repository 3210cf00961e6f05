//! 单份答卷处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：委托 `EvaluationFlow` 完成识别、阅卷、解析
//! 2. **结果输出**：通过 `ReportWriter` 追加到阅卷报告
//! 3. **日志记录**：输出单份答卷的得分汇总

use crate::models::submission::Submission;
use crate::services::ReportWriter;
use crate::workflow::EvaluationFlow;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 处理单份答卷
///
/// # 参数
/// - `flow`: 阅卷流程（各答卷复用）
/// - `writer`: 报告写入服务
/// - `submission`: 答卷数据
/// - `submission_index`: 答卷编号（用于日志）
///
/// # 返回
/// 返回是否解析出了逐题结果
pub async fn process_submission(
    flow: &EvaluationFlow,
    writer: &ReportWriter,
    submission: &Submission,
    submission_index: usize,
) -> Result<bool> {
    info!("[答卷 {}] 开始处理: {}", submission_index, submission.name);
    if let Some(path) = &submission.file_path {
        info!("[答卷 {}] 文件: {}", submission_index, path);
    }

    let run = flow
        .run_submission(submission)
        .await
        .with_context(|| format!("答卷阅卷失败: {}", submission.name))?;

    writer
        .write(&submission.name, &run.transcript, &run.report)
        .with_context(|| format!("阅卷报告写入失败: {}", submission.name))?;

    if run.report.is_structured() {
        info!("[答卷 {}] ✅ {}", submission_index, run.report.summary);
        Ok(true)
    } else {
        warn!(
            "[答卷 {}] ⚠️ 未能解析出逐题结果，已写入原始阅卷文本",
            submission_index
        );
        Ok(false)
    }
}
