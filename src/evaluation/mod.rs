//! 阅卷结果解析（纯函数，无 I/O）
//!
//! ```text
//! 阅卷文本 → segmenter::segment → Vec<QuestionRecord> → aggregator::aggregate → EvaluationSummary
//! ```
//!
//! 两个步骤都不会失败：无法识别的结构表现为空记录列表或 `0/0` 得分，
//! 调用方在记录为空时应直接展示原始文本。

pub mod aggregator;
pub mod segmenter;

pub use aggregator::{aggregate, extract_score};
pub use segmenter::segment;

use crate::models::evaluation::EvaluationReport;

/// 解析阅卷文本并汇总得分
pub fn evaluate_transcript(transcript: &str) -> EvaluationReport {
    let records = segment(transcript);
    let summary = aggregate(&records);
    EvaluationReport { records, summary }
}
