//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量答卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载答卷（Vec<Submission>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `submission_processor` - 单份答卷处理器
//! - 调用 `workflow::EvaluationFlow`
//! - 写入阅卷报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Submission>)
//!     ↓
//! submission_processor (处理单份 Submission)
//!     ↓
//! workflow::EvaluationFlow
//!     ↓
//! services (能力层：llm / image_host / text_extractor / report_writer)
//!     ↓
//! evaluation (纯函数：segment / aggregate)
//! ```

pub mod batch_processor;
pub mod submission_processor;

pub use batch_processor::{App, ProcessingStats};
pub use submission_processor::process_submission;
