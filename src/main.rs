use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newscast_backend::domain::bulletin::BulletinService;
use newscast_backend::domain::sources::SourceCollector;
use newscast_backend::domain::voice::{build_detector, TimingProfile, VoiceSynthesizer};
use newscast_backend::infrastructure::cache::{BulletinCache, MokaBulletinCache};
use newscast_backend::infrastructure::config::{Config, LogFormat, TtsProviderSetting};
use newscast_backend::infrastructure::http::{build_router, start_http_server};
use newscast_backend::infrastructure::jobs::JobRegistry;
use newscast_backend::infrastructure::repositories::{
    build_http_client, ElevenLabsTtsRepository, GoogleNewsRepository, NewsRepository, OpenAiLlmRepository,
    OpenAiTtsRepository, PollyTtsRepository, TavilyNewsRepository, TtsRepository,
};
use newscast_backend::infrastructure::storage::AudioStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting Newscast Backend on {}:{}",
        config.host,
        config.port
    );

    let http_timeout = Duration::from_secs(config.http_timeout_secs);
    let llm_timeout = Duration::from_secs(config.llm_timeout_secs);

    // Outbound HTTP clients
    let http = build_http_client(http_timeout)?;
    let slow_http = build_http_client(llm_timeout)?;

    // OpenAI client, shared by the language model and OpenAI speech
    let has_openai_key = std::env::var("OPENAI_API_KEY").is_ok();
    if !has_openai_key {
        tracing::warn!("OPENAI_API_KEY not set, language model calls will fail and bulletins fall back to headline digests");
    }
    let openai_client = Arc::new(Client::with_config(OpenAIConfig::default()).with_http_client(slow_http.clone()));

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Source providers
    tracing::info!("Instantiating source providers...");
    let mut news_providers: Vec<Arc<dyn NewsRepository>> = vec![Arc::new(GoogleNewsRepository::new(http.clone()))];
    match &config.tavily_api_key {
        Some(key) => news_providers.push(Arc::new(TavilyNewsRepository::new(http.clone(), key.clone()))),
        None => tracing::info!("TAVILY_API_KEY not set, Tavily search disabled"),
    }
    let collector = Arc::new(SourceCollector::new(
        news_providers,
        config.recent_hours,
        config.max_fanout,
    ));

    // 2. Language model
    let llm = Arc::new(OpenAiLlmRepository::new(openai_client.clone(), config.llm_model.clone()));

    // 3. Speech providers, in fallback order
    tracing::info!(provider = ?config.tts_provider, "Instantiating speech providers...");
    let openai_tts = || -> Arc<dyn TtsRepository> {
        Arc::new(OpenAiTtsRepository::new(openai_client.clone(), config.openai_tts_model.clone()))
    };
    let elevenlabs_tts = || -> Option<Arc<dyn TtsRepository>> {
        config.elevenlabs_api_key.as_ref().map(|key| -> Arc<dyn TtsRepository> {
            Arc::new(ElevenLabsTtsRepository::new(
                slow_http.clone(),
                key.clone(),
                config.elevenlabs_model.clone(),
            ))
        })
    };

    let tts_providers: Vec<Arc<dyn TtsRepository>> = match config.tts_provider {
        TtsProviderSetting::OpenAi => vec![openai_tts()],
        TtsProviderSetting::ElevenLabs => elevenlabs_tts().into_iter().collect(),
        TtsProviderSetting::Auto => elevenlabs_tts().into_iter().chain([openai_tts()]).collect(),
        TtsProviderSetting::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);
            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .timeout_config(
                    aws_config::timeout::TimeoutConfig::builder()
                        .operation_timeout(llm_timeout)
                        .build(),
                )
                .load()
                .await;
            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            vec![Arc::new(PollyTtsRepository::new(polly_client))]
        }
    };

    let synthesizer = Arc::new(VoiceSynthesizer::new(
        tts_providers,
        config.default_voice.clone(),
        TimingProfile::new(config.default_wpm)?,
    ));

    // 4. Storage and cache
    let store = Arc::new(AudioStore::new(config.data_dir.clone()).await?);
    tracing::info!(dir = %store.dir().display(), "Audio store ready");

    let cache: Option<Arc<dyn BulletinCache>> = if config.bulletin_cache_enabled {
        Some(Arc::new(MokaBulletinCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )))
    } else {
        None
    };

    // 5. Service
    tracing::info!("Instantiating bulletin service...");
    let bulletin_service = Arc::new(BulletinService::new(
        collector,
        llm,
        synthesizer,
        store,
        cache,
        build_detector(),
        config.default_preset,
    ));

    // 6. Background jobs
    let jobs = Arc::new(JobRegistry::new(
        config.job_capacity,
        Duration::from_secs(config.job_ttl_secs),
    ));

    // Start HTTP server with all routes
    let app = build_router(bulletin_service, jobs);
    start_http_server(Arc::new(config), app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.environment.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| config.environment.default_log_filter().into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
