use async_openai::error::OpenAIError;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 外部 HTTP 接口调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 文件文字提取错误
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 请求参数不合法（消息直接展示给调用方）
    #[error("{0}")]
    Validation(String),
    /// 资源不存在
    #[error("{0}")]
    NotFound(String),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 外部 HTTP 接口调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API 密钥
    #[error("LLM API key not configured")]
    MissingApiKey,
    /// 构建请求失败
    #[error("构建LLM请求失败: {0}")]
    RequestBuild(#[source] OpenAIError),
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: OpenAIError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 文件文字提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 未上传文件
    #[error("No file provided")]
    NoFile,
    /// 不支持的文件类型
    #[error("Unsupported file type. Please upload images (PNG, JPG) or PDFs.")]
    UnsupportedType { mime_type: String },
    /// 图片上传到图床失败
    #[error("Failed to upload image")]
    UploadFailed { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {name} 的值 '{value}' 不合法")]
    InvalidValue { name: String, value: String },
    /// 监听地址无法绑定（端口被占用、权限不足等）
    #[error("无法监听地址 {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: err,
        })
    }
}

impl From<OpenAIError> for AppError {
    fn from(err: OpenAIError) -> Self {
        AppError::Llm(LlmError::RequestBuild(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求参数错误
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// 创建资源不存在错误
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, source: OpenAIError) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 该错误是否由调用方的输入引起
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Extraction(ExtractionError::NoFile)
                | AppError::Extraction(ExtractionError::UnsupportedType { .. })
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
