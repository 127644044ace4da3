use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Repository for text completion.
/// Abstracts the underlying model provider; callers treat every error as a
/// failed attempt.
#[async_trait]
pub trait LanguageModelRepository: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, String>;

    async fn check_health(&self) -> bool;
}
