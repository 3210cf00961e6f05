/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 阅卷模型
    pub grading_model: String,
    /// 辅导对话模型
    pub chat_model: String,
    /// 图片文字识别模型
    pub vision_model: String,
    // --- 图床配置 ---
    pub image_host_url: String,
    pub image_host_api_key: String,
    // --- HTTP 服务 ---
    /// 监听地址
    pub server_addr: String,
    /// 上传文件大小上限（字节）
    pub upload_limit_bytes: usize,
    // --- 批量阅卷 ---
    /// 同时处理的答卷数量
    pub max_concurrent_submissions: usize,
    /// 答卷 TOML 文件存放目录
    pub submissions_folder: String,
    /// 阅卷报告输出文件
    pub output_log_file: String,
    /// 学习会话持久化文件（为空时只保存在内存中）
    pub session_store_path: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://openrouter.ai/api/v1".to_string(),
            grading_model: "mistralai/mistral-7b-instruct:free".to_string(),
            chat_model: "mistralai/mixtral-8x7b-instruct".to_string(),
            vision_model: "qwen/qwen-2-vl-7b-instruct".to_string(),
            image_host_url: "https://freeimage.host/api/1/upload".to_string(),
            image_host_api_key: String::new(),
            server_addr: "0.0.0.0:3000".to_string(),
            upload_limit_bytes: 10 * 1024 * 1024,
            max_concurrent_submissions: 4,
            submissions_folder: "submissions".to_string(),
            output_log_file: "evaluation_report.txt".to_string(),
            session_store_path: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL")
                .unwrap_or(default.llm_api_base_url),
            grading_model: std::env::var("GRADING_MODEL").unwrap_or(default.grading_model),
            chat_model: std::env::var("CHAT_MODEL").unwrap_or(default.chat_model),
            vision_model: std::env::var("VISION_MODEL").unwrap_or(default.vision_model),
            image_host_url: std::env::var("IMAGE_HOST_URL").unwrap_or(default.image_host_url),
            image_host_api_key: std::env::var("IMAGE_HOST_API_KEY")
                .unwrap_or(default.image_host_api_key),
            server_addr: std::env::var("SERVER_ADDR").unwrap_or(default.server_addr),
            upload_limit_bytes: std::env::var("UPLOAD_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upload_limit_bytes),
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default.max_concurrent_submissions),
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER")
                .unwrap_or(default.submissions_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            session_store_path: std::env::var("SESSION_STORE_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }

    /// 是否配置了 LLM API 密钥
    pub fn has_llm_credentials(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_credentials() {
        let config = Config::default();
        assert!(!config.has_llm_credentials());
        assert_eq!(config.max_concurrent_submissions, 4);
        assert_eq!(config.upload_limit_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        let config = Config {
            llm_api_key: "   ".to_string(),
            ..Config::default()
        };
        assert!(!config.has_llm_credentials());
    }
}
