//! 图床服务 - 业务能力层
//!
//! 只负责"把图片上传到图床并拿到公网 URL"能力，识别模型只接受 URL

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, ExtractionError};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status_code: Option<u16>,
    image: Option<UploadedImage>,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

/// 图床客户端
#[derive(Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

impl ImageHost {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url: config.image_host_url.clone(),
            api_key: config.image_host_api_key.clone(),
        }
    }

    /// 上传图片
    ///
    /// # 参数
    /// - `bytes`: 图片内容
    /// - `file_name`: 文件名
    /// - `mime_type`: MIME 类型
    ///
    /// # 返回
    /// 返回图片的公网 URL；HTTP 状态或返回体中的 `status_code` 不是 200 时视为失败
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str, mime_type: &str) -> AppResult<String> {
        debug!("上传图片到图床: {} ({} 字节)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new()
            .part("source", part)
            .text("key", self.api_key.clone())
            .text("format", "json");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("图床上传失败，HTTP 状态: {}", status);
            return Err(ExtractionError::UploadFailed {
                reason: format!("HTTP {}", status),
            }
            .into());
        }

        let body: UploadResponse = response.json().await?;
        parse_upload_response(body)
    }
}

fn parse_upload_response(body: UploadResponse) -> AppResult<String> {
    match body {
        UploadResponse {
            status_code: Some(200),
            image: Some(image),
        } => {
            debug!("图片上传成功: {}", image.url);
            Ok(image.url)
        }
        other => {
            warn!("图床返回异常: status_code={:?}", other.status_code);
            Err(ExtractionError::UploadFailed {
                reason: format!("status_code={:?}", other.status_code),
            }
            .into())
        }
    }
}
