pub mod image_host;
pub mod llm_service;
pub mod prompts;
pub mod report_writer;
pub mod text_extractor;

pub use image_host::ImageHost;
pub use llm_service::{CompletionOptions, LlmService, PromptMessage};
pub use report_writer::ReportWriter;
pub use text_extractor::{FileKind, TextExtractor, UploadedFile};
