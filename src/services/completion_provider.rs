use std::time::{Duration, Instant};

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use schemars::JsonSchema;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{ChatMessage, ChatRole},
    services::{chunk_sanitizer::strip_code_fence, prompt_builder::Prompt},
};

/// Incremental text fragments in arrival order.
pub type TextStream = BoxStream<'static, AppResult<String>>;

/// JSON schema the model is asked to conform to.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn for_type<T: JsonSchema>(name: &str) -> AppResult<Self> {
        let schema = schemars::schema_for!(T);
        Ok(Self {
            name: name.to_string(),
            schema: serde_json::to_value(&schema)?,
        })
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One-shot completion returning the raw assistant text.
    async fn complete_structured(
        &self,
        prompt: &Prompt,
        schema: Option<ResponseSchema>,
    ) -> AppResult<String>;

    /// Streams the assistant reply to `messages` fragment by fragment.
    async fn complete_stream(&self, messages: Vec<ChatMessage>) -> AppResult<TextStream>;
}

/// Requests a completion shaped like `T` and parses it, tolerating a code fence
/// around the JSON body.
pub async fn complete_as<T>(
    provider: &dyn CompletionProvider,
    prompt: &Prompt,
    schema_name: &str,
) -> AppResult<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = ResponseSchema::for_type::<T>(schema_name)?;
    let raw = provider.complete_structured(prompt, Some(schema)).await?;
    let payload = strip_code_fence(raw.trim());

    serde_json::from_str(payload).map_err(|e| {
        AppError::ParseError(format!("model output is not a valid {}: {}", schema_name, e))
    })
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessageReq>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessageReq {
    role: ChatRole,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl From<&ChatMessage> for ChatMessageReq {
    fn from(message: &ChatMessage) -> Self {
        ChatMessageReq {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// OpenAI-compatible chat completions over `async-openai` with our own
/// request and response shapes.
pub struct OpenAiCompletionProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiCompletionProvider {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.openai_api_key.expose_secret())
            .with_api_base(&config.openai_api_base);

        Self {
            client: Client::with_config(openai_config),
            model: config.openai_model.clone(),
            timeout: Duration::from_secs(config.openai_timeout_secs),
        }
    }

    fn timed_out(&self) -> AppError {
        AppError::ProviderError(format!(
            "completion timed out after {}s",
            self.timeout.as_secs()
        ))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete_structured(
        &self,
        prompt: &Prompt,
        schema: Option<ResponseSchema>,
    ) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessageReq {
                    role: ChatRole::System,
                    content: prompt.system.clone(),
                },
                ChatMessageReq {
                    role: ChatRole::User,
                    content: prompt.user.clone(),
                },
            ],
            response_format: schema.map(|s| ResponseFormat {
                r#type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: s.name,
                    schema: s.schema,
                    strict: false,
                },
            }),
            stream: false,
        };

        let started = Instant::now();
        let response: ChatCompletionResponse = tokio::time::timeout(
            self.timeout,
            self.client
                .chat()
                .create_byot::<_, ChatCompletionResponse>(request),
        )
        .await
        .map_err(|_| self.timed_out())??;

        if let Some(usage) = &response.usage {
            log::info!(
                "Completion usage model={} prompt_tokens={:?} completion_tokens={:?} total_tokens={:?} elapsed_ms={}",
                self.model,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
                started.elapsed().as_millis()
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::ProviderError("completion returned no content".to_string()))
    }

    async fn complete_stream(&self, messages: Vec<ChatMessage>) -> AppResult<TextStream> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessageReq::from).collect(),
            response_format: None,
            stream: true,
        };

        log::debug!(
            "Opening completion stream model={} messages={}",
            self.model,
            request.messages.len()
        );

        let chunks = tokio::time::timeout(
            self.timeout,
            self.client
                .chat()
                .create_stream_byot::<_, ChatCompletionChunk>(request),
        )
        .await
        .map_err(|_| self.timed_out())??;

        let fragments = chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) => chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(AppError::from(e))),
            }
        });

        Ok(fragments.boxed())
    }
}
