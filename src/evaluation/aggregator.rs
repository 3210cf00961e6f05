//! 得分汇总
//!
//! 总分由各题得分字段重新累加，不采信 LLM 自己给出的总分。

use regex::Regex;
use std::sync::OnceLock;

use crate::models::evaluation::{EvaluationSummary, QuestionRecord, ScorePair};

/// 得分字段中的 "得分/满分"，分子分母必须来自同一个斜杠
fn score_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d+)\s*/\s*(\d+)").ok())
        .as_ref()
}

/// 从得分字段提取 得分/满分
///
/// 没有可识别的数字对（或数字超出范围）时返回 `0/0`，不会报错。
pub fn extract_score(score_text: &str) -> ScorePair {
    score_pattern()
        .and_then(|re| re.captures(score_text))
        .and_then(|caps| {
            let achieved = caps[1].parse::<u32>().ok()?;
            let possible = caps[2].parse::<u32>().ok()?;
            Some(ScorePair::new(achieved, possible))
        })
        .unwrap_or_default()
}

/// 汇总所有题目的得分
///
/// `question_count` 为记录总数，与得分能否解析无关。
pub fn aggregate(records: &[QuestionRecord]) -> EvaluationSummary {
    let (total_achieved, total_possible) = records
        .iter()
        .map(|record| extract_score(&record.score_text))
        .fold((0u64, 0u64), |(achieved, possible), pair| {
            (achieved + u64::from(pair.achieved), possible + u64::from(pair.possible))
        });

    EvaluationSummary {
        total_achieved,
        total_possible,
        percentage: round_percentage(total_achieved, total_possible),
        question_count: records.len(),
    }
}

/// 四舍五入（0.5 进位）的百分比，满分为 0 时返回 0
fn round_percentage(achieved: u64, possible: u64) -> u64 {
    if possible == 0 {
        return 0;
    }
    // round(a / p * 100) == floor((200a + p) / 2p)
    (achieved * 200 + possible) / (possible * 2)
}
