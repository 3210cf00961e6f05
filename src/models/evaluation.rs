use serde::{Deserialize, Serialize};
use std::fmt;

/// 阅卷结果中的一道题
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    /// 题目内容（转写可能遗漏，此时为空）
    pub question: String,
    /// 学生答案
    pub student_answer: String,
    /// LLM 原样给出的得分字段，例如 "7/10"，不保证是数字
    pub score_text: String,
    /// 评语，多行评语以单个空格拼接
    pub feedback: String,
}

/// 从得分字段中提取出的 得分/满分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub achieved: u32,
    pub possible: u32,
}

impl ScorePair {
    pub fn new(achieved: u32, possible: u32) -> Self {
        Self { achieved, possible }
    }
}

/// 全部题目的汇总统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub total_achieved: u64,
    pub total_possible: u64,
    /// 四舍五入后的百分比，满分为 0 时为 0
    pub percentage: u64,
    pub question_count: usize,
}

/// 解析后的阅卷结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub records: Vec<QuestionRecord>,
    pub summary: EvaluationSummary,
}

impl EvaluationReport {
    /// 是否成功解析出至少一道题
    ///
    /// 返回 false 时调用方应直接展示原始阅卷文本
    pub fn is_structured(&self) -> bool {
        !self.records.is_empty()
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total Score: {}/{} | Percentage: {}% | Questions: {}",
            self.total_achieved, self.total_possible, self.percentage, self.question_count
        )
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        for (index, record) in self.records.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Q{}. {}", index + 1, record.question)?;
            if !record.student_answer.is_empty() {
                writeln!(f, "   Student's Answer: {}", record.student_answer)?;
            }
            if !record.score_text.is_empty() {
                writeln!(f, "   Score: {}", record.score_text)?;
            }
            if !record.feedback.is_empty() {
                writeln!(f, "   Feedback: {}", record.feedback)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_camel_case() {
        let record = QuestionRecord {
            question: "What is 2+2?".to_string(),
            student_answer: "4".to_string(),
            score_text: "2/2".to_string(),
            feedback: "Correct.".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["studentAnswer"], "4");
        assert_eq!(json["scoreText"], "2/2");
    }

    #[test]
    fn test_report_display() {
        let report = EvaluationReport {
            records: vec![QuestionRecord {
                question: "What is 2+2?".to_string(),
                student_answer: "4".to_string(),
                score_text: "2/2".to_string(),
                feedback: String::new(),
            }],
            summary: EvaluationSummary {
                total_achieved: 2,
                total_possible: 2,
                percentage: 100,
                question_count: 1,
            },
        };
        let rendered = report.to_string();
        assert!(rendered.starts_with("Total Score: 2/2 | Percentage: 100% | Questions: 1"));
        assert!(rendered.contains("Q1. What is 2+2?"));
        assert!(!rendered.contains("Feedback:"));
    }
}
