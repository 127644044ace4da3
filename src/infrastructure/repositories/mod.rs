pub mod elevenlabs_tts_repository;
pub mod google_news_repository;
pub mod llm_repository;
pub mod news_repository;
pub mod openai_llm_repository;
pub mod openai_tts_repository;
pub mod polly_tts_repository;
pub mod tavily_news_repository;
pub mod tts_repository;

use std::time::Duration;

pub use elevenlabs_tts_repository::ElevenLabsTtsRepository;
pub use google_news_repository::GoogleNewsRepository;
pub use llm_repository::{CompletionRequest, LanguageModelRepository};
pub use news_repository::{NewsQuery, NewsRepository};
pub use openai_llm_repository::OpenAiLlmRepository;
pub use openai_tts_repository::OpenAiTtsRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use tavily_news_repository::TavilyNewsRepository;
pub use tts_repository::{split_into_batches, TtsRepository};

const USER_AGENT: &str = concat!("newscast-backend/", env!("CARGO_PKG_VERSION"));

/// Shared outbound HTTP client; every request it sends is bounded by `timeout`
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
