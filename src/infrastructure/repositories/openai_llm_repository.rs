use super::llm_repository::{CompletionRequest, LanguageModelRepository};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI chat completions implementation of the language model repository
pub struct OpenAiLlmRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiLlmRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn messages(request: &CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>, String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system.clone())
            .build()
            .map_err(|e| e.to_string())?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.clone())
            .build()
            .map_err(|e| e.to_string())?;
        Ok(vec![system.into(), user.into()])
    }
}

#[async_trait]
impl LanguageModelRepository for OpenAiLlmRepository {
    async fn complete(&self, request: CompletionRequest) -> Result<String, String> {
        let start_time = std::time::Instant::now();

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(Self::messages(&request)?)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .build()
            .map_err(|e| format!("Invalid completion request: {}", e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                latency_ms = start_time.elapsed().as_millis() as u64,
                "OpenAI chat completion failed"
            );
            format!("OpenAI completion error: {}", e)
        })?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| "Empty response from language model".to_string())?
            .clone();

        tracing::info!(
            provider = "openai",
            model = %self.model,
            latency_ms = start_time.elapsed().as_millis() as u64,
            prompt_tokens = response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            response_chars = text.len(),
            "Completion received"
        );

        Ok(text)
    }

    async fn check_health(&self) -> bool {
        match self.client.models().list().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI health check failed");
                false
            }
        }
    }
}
