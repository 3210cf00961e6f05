//! LLM 服务 - 业务能力层
//!
//! 只负责"调用大模型"能力：阅卷、图片文字识别、辅导对话，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（默认 OpenRouter）
//! - 阅卷、识别、对话分别使用独立配置的模型

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, CreateChatCompletionStreamResponse, ImageDetail, ImageUrl,
    },
    Client,
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};
use crate::models::session::Role;
use crate::services::prompts;

/// 采样参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
}

impl CompletionOptions {
    /// 阅卷：低温度，长输出
    pub fn grading() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 10000,
            top_p: Some(0.9),
        }
    }

    /// 图片文字识别
    pub fn ocr() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 4096,
            top_p: Some(0.9),
        }
    }

    /// 辅导对话
    pub fn chat() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: None,
        }
    }
}

/// 发送给模型的一条消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// LLM 服务
///
/// 职责：
/// - 阅卷：根据试卷、答案、学生作答生成阅卷文本
/// - 识别：从图片 URL 中提取文字
/// - 对话：转发辅导对话（整包或流式）
/// - 不解析阅卷文本，不关心会话存储
#[derive(Clone)]
pub struct LlmService {
    client: Client<OpenAIConfig>,
    has_api_key: bool,
    grading_model: String,
    chat_model: String,
    vision_model: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            has_api_key: config.has_llm_credentials(),
            grading_model: config.grading_model.clone(),
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
        }
    }

    /// 是否配置了 API 密钥
    pub fn is_configured(&self) -> bool {
        self.has_api_key
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if self.has_api_key {
            Ok(())
        } else {
            Err(LlmError::MissingApiKey.into())
        }
    }

    /// 通用的单轮 LLM 调用
    ///
    /// # 参数
    /// - `model`: 模型名称
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `imgs`: 图片 URL 列表（可选），会追加到用户消息中
    /// - `options`: 采样参数
    ///
    /// # 返回
    /// 返回去掉首尾空白的响应内容
    pub async fn send_to_llm(
        &self,
        model: &str,
        user_message: &str,
        system_message: Option<&str>,
        imgs: Option<&[String]>,
        options: CompletionOptions,
    ) -> AppResult<String> {
        self.ensure_configured()?;

        debug!("调用 LLM API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = match imgs {
            Some(img_urls) if !img_urls.is_empty() => {
                // Vision API：文本 + 图片
                let mut content_parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: user_message.to_string(),
                    },
                )];

                for url in img_urls {
                    content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: url.clone(),
                                detail: Some(ImageDetail::Auto),
                            },
                        },
                    ));
                }

                debug!("使用 Vision API，包含 {} 张图片", img_urls.len());

                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()?
            }
            _ => ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()?,
        };

        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = build_request(model, messages, options, false)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        first_content(&response)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                LlmError::EmptyContent {
                    model: model.to_string(),
                }
                .into()
            })
    }

    /// 阅卷，返回 LLM 的原始阅卷文本
    pub async fn grade(
        &self,
        question_paper: &str,
        answer_key: &str,
        student_answers: &str,
    ) -> AppResult<String> {
        let prompt = prompts::build_grading_prompt(question_paper, answer_key, student_answers);
        self.send_to_llm(
            &self.grading_model,
            &prompt,
            Some(prompts::GRADING_SYSTEM_MESSAGE),
            None,
            CompletionOptions::grading(),
        )
        .await
    }

    /// 识别图片中的文字（含手写体）
    ///
    /// 模型没有返回内容时得到 `"No text detected"`，而不是错误。
    pub async fn extract_text_from_image(&self, image_url: &str) -> AppResult<String> {
        let images = [image_url.to_string()];
        match self
            .send_to_llm(
                &self.vision_model,
                prompts::OCR_PROMPT,
                None,
                Some(&images),
                CompletionOptions::ocr(),
            )
            .await
        {
            Err(AppError::Llm(LlmError::EmptyContent { .. })) => {
                warn!("图片未识别到文字: {}", image_url);
                Ok(prompts::NO_TEXT_DETECTED.to_string())
            }
            other => other,
        }
    }

    /// 多轮对话，返回完整的补全响应
    pub async fn chat(
        &self,
        messages: &[PromptMessage],
        options: CompletionOptions,
    ) -> AppResult<CreateChatCompletionResponse> {
        self.ensure_configured()?;
        debug!("转发对话请求，模型: {}，消息数: {}", self.chat_model, messages.len());

        let request = build_request(&self.chat_model, to_request_messages(messages)?, options, false)?;
        self.client
            .chat()
            .create(request)
            .await
            .map_err(|e| AppError::llm_api_failed(&self.chat_model, e))
    }

    /// 多轮对话，只返回回复文本
    pub async fn chat_text(
        &self,
        messages: &[PromptMessage],
        options: CompletionOptions,
    ) -> AppResult<String> {
        let response = self.chat(messages, options).await?;
        first_content(&response)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                LlmError::EmptyContent {
                    model: self.chat_model.clone(),
                }
                .into()
            })
    }

    /// 流式多轮对话
    pub async fn chat_stream(
        &self,
        messages: &[PromptMessage],
        options: CompletionOptions,
    ) -> AppResult<impl Stream<Item = AppResult<CreateChatCompletionStreamResponse>> + Send + 'static>
    {
        self.ensure_configured()?;
        debug!("转发流式对话请求，模型: {}", self.chat_model);

        let request = build_request(&self.chat_model, to_request_messages(messages)?, options, true)?;
        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| AppError::llm_api_failed(&self.chat_model, e))?;

        let model = self.chat_model.clone();
        Ok(stream.map(move |chunk| chunk.map_err(|e| AppError::llm_api_failed(&model, e))))
    }
}

/// 构建补全请求
fn build_request(
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    options: CompletionOptions,
    stream: bool,
) -> AppResult<CreateChatCompletionRequest> {
    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(model)
        .messages(messages)
        .temperature(options.temperature)
        .max_tokens(options.max_tokens);
    if let Some(top_p) = options.top_p {
        args.top_p(top_p);
    }
    if stream {
        args.stream(true);
    }
    Ok(args.build()?)
}

/// 把接口消息转换为 async-openai 的请求消息
fn to_request_messages(messages: &[PromptMessage]) -> AppResult<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|message| {
            let content = message.content.as_str();
            Ok(match message.role {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(content)
                        .build()?,
                ),
                Role::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(content)
                        .build()?,
                ),
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(content)
                        .build()?,
                ),
            })
        })
        .collect()
}

fn first_content(response: &CreateChatCompletionResponse) -> Option<&str> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
}
