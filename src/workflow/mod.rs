//! 流程层：阅卷流程与辅导对话流程

pub mod evaluation_flow;
pub mod tutor_flow;

pub use evaluation_flow::{EvaluationFlow, EvaluationRun};
pub use tutor_flow::{title_from_message, TutorFlow};
