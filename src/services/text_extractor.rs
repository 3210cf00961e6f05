//! 文字提取服务 - 业务能力层
//!
//! 只负责"把上传的文件变成文字"能力：
//! - 图片：上传图床 → 视觉模型识别
//! - PDF：暂不解析，返回转换提示
//! - 其他类型：明确报错

use tracing::{debug, info};

use crate::error::{AppResult, ExtractionError};
use crate::services::image_host::ImageHost;
use crate::services::llm_service::LlmService;
use crate::services::prompts;

/// 文件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    Unsupported,
}

impl FileKind {
    /// 根据 MIME 类型判断文件种类
    pub fn classify(mime_type: &str) -> Self {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if mime_type == "application/pdf" {
            FileKind::Pdf
        } else if mime_type.starts_with("image/") {
            FileKind::Image
        } else {
            FileKind::Unsupported
        }
    }
}

/// 一个待提取文字的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 文字提取服务
#[derive(Clone)]
pub struct TextExtractor {
    image_host: ImageHost,
    llm_service: LlmService,
}

impl TextExtractor {
    pub fn new(image_host: ImageHost, llm_service: LlmService) -> Self {
        Self {
            image_host,
            llm_service,
        }
    }

    /// 提取单个文件中的文字
    pub async fn extract_text(&self, file: UploadedFile) -> AppResult<String> {
        match FileKind::classify(&file.mime_type) {
            FileKind::Pdf => {
                debug!("PDF 文件暂不解析: {}", file.file_name);
                Ok(prompts::PDF_GUIDANCE.to_string())
            }
            FileKind::Image => {
                info!("🖼️ 识别图片文字: {}", file.file_name);
                let image_url = self
                    .image_host
                    .upload(file.bytes, &file.file_name, &file.mime_type)
                    .await?;
                self.llm_service.extract_text_from_image(&image_url).await
            }
            FileKind::Unsupported => Err(ExtractionError::UnsupportedType {
                mime_type: file.mime_type,
            }
            .into()),
        }
    }

    /// 依次提取多个文件的文字，每个文件的结果后追加换行
    pub async fn extract_many(&self, files: Vec<UploadedFile>) -> AppResult<String> {
        let mut text = String::new();
        for file in files {
            text.push_str(&self.extract_text(file).await?);
            text.push('\n');
        }
        Ok(text)
    }
}
