//! 阅卷文本分段器
//!
//! 把 LLM 返回的阅卷文本按行切分为逐题记录。LLM 输出格式不可信，
//! 这里只做尽力解析：无法识别的行直接丢弃，从不返回错误。

use crate::models::evaluation::QuestionRecord;

/// 行前缀对应的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Question,
    StudentAnswer,
    Score,
    Feedback,
}

/// 行前缀表（小写），按顺序尝试
///
/// 同一字段的多个前缀中，更具体的必须排在前面。
const FIELD_PREFIXES: &[(&str, Field)] = &[
    ("question:", Field::Question),
    ("student's answer:", Field::StudentAnswer),
    ("student answer:", Field::StudentAnswer),
    ("score:", Field::Score),
    ("feedback:", Field::Feedback),
];

/// 出现在续行中即视为非评语内容的标记
const QUESTION_MARKER: &str = "question:";

/// 将阅卷文本切分为逐题记录，保持原文顺序
///
/// 没有题目内容的记录（题目前的噪声）不会输出。
pub fn segment(transcript: &str) -> Vec<QuestionRecord> {
    let mut records = Vec::new();
    let mut current = QuestionRecord::default();
    let mut seen_question = false;

    for line in transcript.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let matched = match_field(line);

        // 第一道题之前的所有行都是噪声
        if !seen_question && !matches!(matched, Some((Field::Question, _))) {
            continue;
        }

        match matched {
            Some((Field::Question, value)) => {
                seen_question = true;
                // 只有已有题目内容的记录才会结束，空题目行只更新题目
                if !current.question.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
                current.question = value.to_string();
            }
            Some((Field::StudentAnswer, value)) => current.student_answer = value.to_string(),
            Some((Field::Score, value)) => current.score_text = value.to_string(),
            Some((Field::Feedback, value)) => current.feedback = value.to_string(),
            None => {
                // 多行评语的续行
                if !current.feedback.is_empty()
                    && !line.to_lowercase().contains(QUESTION_MARKER)
                {
                    current.feedback.push(' ');
                    current.feedback.push_str(line);
                }
            }
        }
    }

    if !current.question.is_empty() {
        records.push(current);
    }

    records
}

/// 匹配行前缀（忽略大小写），返回字段和去掉前缀后的内容
fn match_field(line: &str) -> Option<(Field, &str)> {
    FIELD_PREFIXES.iter().find_map(|(prefix, field)| {
        strip_prefix_ignore_case(line, prefix).map(|rest| (*field, rest.trim()))
    })
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(question: &str, answer: &str, score: &str, feedback: &str) -> QuestionRecord {
        QuestionRecord {
            question: question.to_string(),
            student_answer: answer.to_string(),
            score_text: score.to_string(),
            feedback: feedback.to_string(),
        }
    }

    #[test]
    fn test_well_formed_blocks() {
        let transcript = "Question: What is 2+2?\n\
                          Student's Answer: 4\n\
                          Score: 2/2\n\
                          Feedback: Correct.\n\
                          Question: Name a prime.\n\
                          Student's Answer: 9\n\
                          Score: 0/1\n\
                          Feedback: 9 is not prime.";

        let records = segment(transcript);
        assert_eq!(
            records,
            vec![
                record("What is 2+2?", "4", "2/2", "Correct."),
                record("Name a prime.", "9", "0/1", "9 is not prime."),
            ]
        );
    }

    #[test]
    fn test_prefixes_are_case_insensitive() {
        let transcript = "QUESTION: Capital of France?\nstudent answer: Paris\nSCORE: 1/1\nfeedback: Good";
        let records = segment(transcript);
        assert_eq!(records, vec![record("Capital of France?", "Paris", "1/1", "Good")]);
    }

    #[test]
    fn test_leading_noise_is_ignored() {
        let body = "Question: Q1\nStudent's Answer: A1\nScore: 1/2\nFeedback: Ok";
        let noisy = format!(
            "Here is the evaluation of the paper.\n\nScore: 5/5\nFeedback: orphan\n{}",
            body
        );
        assert_eq!(segment(&noisy), segment(body));
        assert_eq!(segment(&noisy).len(), 1);
    }

    #[test]
    fn test_orphan_fields_do_not_leak_into_first_record() {
        let transcript = "Score: 5/5\nFeedback: orphan\nQuestion: Q1\nStudent's Answer: A1";
        let records = segment(transcript);
        assert_eq!(records, vec![record("Q1", "A1", "", "")]);
    }

    #[test]
    fn test_multi_line_feedback_is_joined_with_spaces() {
        let transcript = "Question: Explain gravity.\n\
                          Feedback: Good start.\n\
                          \n\
                          Mention mass.\n   Mention distance.   ";
        let records = segment(transcript);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].feedback, "Good start. Mention mass. Mention distance.");
    }

    #[test]
    fn test_continuation_containing_question_marker_is_dropped() {
        // 已知的保守行为：包含 "question:" 的续行不会并入评语
        let transcript = "Question: Q1\nFeedback: Fine.\nSee the next question: it is harder.\nMore detail.";
        let records = segment(transcript);
        assert_eq!(records[0].feedback, "Fine. More detail.");
    }

    #[test]
    fn test_lines_before_feedback_are_not_accumulated() {
        let transcript = "Question: Q1\nsome stray commentary\nScore: 1/1";
        let records = segment(transcript);
        assert_eq!(records, vec![record("Q1", "", "1/1", "")]);
    }

    #[test]
    fn test_record_without_question_is_never_emitted() {
        assert!(segment("Score: 3/5\nFeedback: nice\nmore feedback").is_empty());
        assert!(segment("").is_empty());
        assert!(segment("Total marks: 10/20").is_empty());
    }

    #[test]
    fn test_empty_question_line_keeps_collected_fields() {
        let transcript = "Question:\nScore: 1/1\nQuestion: Real one\nStudent answer: yes";
        let records = segment(transcript);
        assert_eq!(records, vec![record("Real one", "yes", "1/1", "")]);
    }

    #[test]
    fn test_empty_question_line_does_not_end_previous_fields() {
        let transcript = "Question: \nFeedback: early\nQuestion: Q1\nScore: 2/3\nQuestion: Q2";
        let records = segment(transcript);
        assert_eq!(
            records,
            vec![record("Q1", "", "2/3", "early"), record("Q2", "", "", "")]
        );
    }

    #[test]
    fn test_non_ascii_lines_do_not_panic() {
        let transcript = "题目：光合作用\nQuestion: ¿Qué es?\nFeedback: très bien\nçà va";
        let records = segment(transcript);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].feedback, "très bien çà va");
    }
}
