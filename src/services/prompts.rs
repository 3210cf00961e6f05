//! 提示词模板
//!
//! 阅卷提示词约定了 `Question: / Student's Answer: / Score: x/y / Feedback:`
//! 的逐行格式，`evaluation::segment` 依赖这一格式进行解析。

use crate::models::session::SessionType;

/// 阅卷系统消息
pub const GRADING_SYSTEM_MESSAGE: &str =
    "You are a teacher grading an exam. Provide detailed, constructive feedback for each answer.";

/// 图片文字识别提示词
pub const OCR_PROMPT: &str = "Extract all text from this image. Return only the text content without any descriptions or commentary. If there is handwriting, convert it to typed text maintaining the original structure and formatting.";

/// 识别结果为空时的占位文本
pub const NO_TEXT_DETECTED: &str = "No text detected";

/// PDF 暂不支持直接提取文字时返回的提示
pub const PDF_GUIDANCE: &str = "PDF processing: Please convert PDF pages to images for better text extraction with handwriting recognition. Alternatively, if this is a text-based PDF, please copy and paste the content directly.";

/// 辅导模型出错时写入会话的回复
pub const TUTOR_APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";

/// 构建阅卷提示词
pub fn build_grading_prompt(question_paper: &str, answer_key: &str, student_answers: &str) -> String {
    format!(
        r#"
Here is the question paper: {question_paper}
Here is the answer key: {answer_key}
Here are the student's answers: {student_answers}

1. Marking Process: Evaluate the student's answers against the question paper and the answer key. Full credit will be awarded for complete and accurate responses, partial credit for answers demonstrating partial understanding, minimal credit for vague or incomplete attempts, and no credit for incorrect or irrelevant responses.

2. Evaluation Methodology:
Multiple Choice Questions (MCQs): Assign full marks for correct answers and zero for incorrect ones.
Short Answer Questions: Evaluate based on key points, awarding partial credit for each correctly addressed point.
Essay Questions: Assess based on structure, coherence, argument depth, and relevance to the question. Partial credit will reflect the inclusion of relevant points and the quality of explanation.

3. AI Features:
Difficulty-based Marks Assignment: For each question, estimate its difficulty IF it is not specified in the question paper or answer key. The marks will be assigned in the question paper itself.
Scoring: Return whole-number scores only. Include straight feedback for improvement and highlight strengths in the answers.

4. Example Output:
Question: xyz
Student's Answer: xyz
Score: x/y
Feedback: xyz

5. Note: It is important to use \n after every line to separate the questions, answers and the feedback. Strictly stick to the answers and questions provided by the user and do not add any additional question and answers on your own.

6. In the end calculate the total marks scored by the student.
"#
    )
}

/// 各辅导模式的系统上下文
pub fn educational_context(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Tutor => "You are an adaptive AI tutor. Analyze the student's response and adapt your teaching approach accordingly. Consider their learning style, current understanding level, and provide personalized explanations. Use the Socratic method when appropriate.",
        SessionType::CodeMentor => "You are a patient code mentor focused on education, not just solutions. When helping with code:
1. Explain the problem-solving approach
2. Guide students to understand concepts
3. Suggest debugging strategies
4. Provide alternative solutions to foster critical thinking
5. Never just give the answer - help them discover it",
        SessionType::Assessment => "You are an assessment generator. Create educational content that tests understanding while providing learning opportunities. Include:
1. Clear rubrics
2. Detailed feedback
3. Improvement suggestions
4. Progressive difficulty levels",
        SessionType::Language => "You are a language learning companion. Provide:
1. Conversational practice with gentle corrections
2. Cultural context for language use
3. Grammar explanations that are easy to understand
4. Vocabulary building exercises
5. Pronunciation tips",
        SessionType::StudyCompanion => "You are a study companion that helps transform learning materials. You can:
1. Create interactive Q&A from text
2. Generate mind maps and concept connections
3. Design flashcards with spaced repetition
4. Break down complex topics into digestible parts",
    }
}

/// 构建辅导对话的系统消息
///
/// # 参数
/// - `context`: 辅导模式上下文
/// - `additional_context`: 附加上下文（例如最近的对话记录）
pub fn build_tutor_system_message(context: &str, additional_context: Option<&str>) -> String {
    format!(
        "{context}

{}

Remember to:
- Be encouraging and patient
- Provide scaffolding (just enough support)
- Use active learning techniques
- Adapt to the student's pace
- Focus on understanding over memorization
- Make learning engaging and interactive",
        additional_context.unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_prompt_embeds_inputs_and_format() {
        let prompt = build_grading_prompt("PAPER", "KEY", "ANSWERS");
        assert!(prompt.contains("Here is the question paper: PAPER"));
        assert!(prompt.contains("Here is the answer key: KEY"));
        assert!(prompt.contains("Here are the student's answers: ANSWERS"));
        assert!(prompt.contains("Score: x/y"));
    }

    #[test]
    fn test_tutor_system_message() {
        let message = build_tutor_system_message(
            educational_context(SessionType::Tutor),
            Some("Previous conversation: []"),
        );
        assert!(message.starts_with("You are an adaptive AI tutor."));
        assert!(message.contains("Previous conversation: []"));
        assert!(message.ends_with("Make learning engaging and interactive"));
    }
}
