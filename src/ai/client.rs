//! Chat-completion client for the annotation pipeline.
//!
//! The generation service is a black box at this boundary: one system prompt,
//! one user prompt, one response string. Everything that comes back is
//! untrusted free text; classifying it is the response parser's job, never
//! the client's.

use anyhow::{Context as _, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};

use crate::config::GenerationConfig;

/// Minimal chat-completion seam.
///
/// One request per call, stateless, no retries. The pipeline treats any
/// transport error as data (an error-marker string), so implementations
/// should surface failures as plain `Err` and let the generator decide.
pub trait ChatService {
    /// Send one system + user prompt pair, returning the trimmed response
    /// text of the single choice.
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Chat client backed by the OpenAI API.
pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
    config: GenerationConfig,
}

impl OpenAiChat {
    /// Create a client with an explicit API key.
    pub fn new(api_key: String, config: GenerationConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(openai_config);

        Self { client, config }
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(config: GenerationConfig) -> Self {
        // OpenAIConfig::default reads OPENAI_API_KEY
        Self {
            client: Client::with_config(OpenAIConfig::default()),
            config,
        }
    }
}

impl ChatService for OpenAiChat {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .context("Failed to build system message")?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .context("Failed to build user message")?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .context("Failed to build chat completion request")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| anyhow::anyhow!("OpenAI API error: {e}"))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response content received"))?;

        Ok(content.trim().to_owned())
    }
}
