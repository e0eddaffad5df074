use super::types::Prompt;
use crate::{Error, Result, config::LlmConfig, schema::Schema};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageUrlArgs,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Remote capability that turns a prompt into structured output.
///
/// `Ok(None)` means the model answered but produced no output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &Prompt,
        output_schema: &'static Schema,
    ) -> Result<Option<Value>>;
}

pub struct OpenAiModelClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAiModelClient {
    pub fn new(config: LlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        // One attempt per call, no retry.
        let single_shot = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = Client::with_config(openai_config).with_backoff(single_shot);

        Self {
            client,
            model: config.model,
            temperature: config.temperature,
            system_prompt: config.system_prompt,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    fn build_messages(&self, prompt: &Prompt) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(2);

        if let Some(system_prompt) = &self.system_prompt {
            let msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(ChatCompletionRequestSystemMessageContent::Text(
                    system_prompt.clone(),
                ))
                .build()
                .map_err(|e| Error::internal(format!("Failed to build system message: {}", e)))?;
            messages.push(msg.into());
        }

        let content = match &prompt.media {
            None => ChatCompletionRequestUserMessageContent::Text(prompt.text.clone()),
            Some(data_uri) => {
                let text = ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(prompt.text.as_str())
                    .build()
                    .map_err(|e| Error::internal(format!("Failed to build text part: {}", e)))?;
                let image_url = ImageUrlArgs::default()
                    .url(data_uri.as_str())
                    .build()
                    .map_err(|e| Error::internal(format!("Failed to build image url: {}", e)))?;
                let image = ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(image_url)
                    .build()
                    .map_err(|e| Error::internal(format!("Failed to build image part: {}", e)))?;
                ChatCompletionRequestUserMessageContent::Array(vec![
                    ChatCompletionRequestUserMessageContentPart::Text(text),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(image),
                ])
            }
        };

        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build user message: {}", e)))?;
        messages.push(msg.into());

        Ok(messages)
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn generate(
        &self,
        prompt: &Prompt,
        output_schema: &'static Schema,
    ) -> Result<Option<Value>> {
        debug!(
            "Invoking model {} for prompt '{}' ({} chars, media: {})",
            self.model,
            prompt.name,
            prompt.text.len(),
            prompt.media.is_some()
        );

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some(output_schema.description.to_string()),
                name: output_schema.name.to_string(),
                schema: Some(output_schema.to_json_schema()),
                strict: None,
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.build_messages(prompt)?)
            .temperature(self.temperature)
            .response_format(response_format)
            .build()
            .map_err(|e| Error::internal(format!("Failed to build chat request: {}", e)))?;

        let chat = self.client.chat();
        let call = chat.create(request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                Error::remote(format!("model call timed out after {}s", limit.as_secs()))
            })??,
            None => call.await?,
        };

        debug!(
            "Received model response with {} choices",
            response.choices.len()
        );

        let Some(choice) = response.choices.into_iter().next() else {
            return Ok(None);
        };

        if let Some(refusal) = choice.message.refusal {
            return Err(Error::remote(format!("model refused: {}", refusal)));
        }

        match choice.message.content {
            Some(content) => parse_output(&content),
            None => Ok(None),
        }
    }
}

/// Parses model text into JSON, tolerating a surrounding Markdown code fence.
pub fn parse_output(content: &str) -> Result<Option<Value>> {
    let body = strip_code_fence(content.trim());
    if body.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| Error::contract(format!("output is not valid JSON: {}", e)))
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
