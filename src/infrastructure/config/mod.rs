use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::domain::bulletin::Preset;
use crate::domain::voice::TimingProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub data_dir: PathBuf,
    // Language model
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    // Speech synthesis
    pub tts_provider: TtsProviderSetting,
    pub openai_tts_model: String,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_model: String,
    pub aws_region: String,
    pub default_voice: Option<String>,
    pub default_wpm: f64,
    pub default_preset: Preset,
    // Sources
    pub tavily_api_key: Option<String>,
    pub recent_hours: u32,
    pub max_fanout: usize,
    pub http_timeout_secs: u64,
    // Bulletin cache
    pub bulletin_cache_enabled: bool,
    pub cache_capacity: u64,
    pub cache_ttl_secs: u64,
    // Background jobs
    pub job_capacity: u64,
    pub job_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => "newscast_backend=debug,tower_http=debug",
            Environment::Production => "newscast_backend=info,tower_http=info",
        }
    }

    /// Log format used when `LOG_FORMAT` is unset
    pub fn default_log_format(&self) -> &'static str {
        match self {
            Environment::Development => "pretty",
            Environment::Production => "json",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which speech provider(s) the synthesizer is wired with
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProviderSetting {
    OpenAi,
    Polly,
    ElevenLabs,
    /// ElevenLabs first when a key is present, OpenAI as fallback
    Auto,
}

impl std::str::FromStr for TtsProviderSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "polly" => Ok(Self::Polly),
            "elevenlabs" => Ok(Self::ElevenLabs),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown TTS_PROVIDER '{}'", other)),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let default_wpm: f64 = env::var("DEFAULT_WPM")
            .unwrap_or_else(|_| "150".to_string())
            .parse()?;
        // Reject implausible speech rates at startup rather than trusting them
        TimingProfile::new(default_wpm)?;

        let environment = match env::var("ENVIRONMENT").unwrap_or_default().trim().to_lowercase().as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: environment.clone(),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| environment.default_log_format().to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            data_dir: PathBuf::from(
                env::var("DATA_DIR").unwrap_or_else(|_| "./data/audio".to_string()),
            ),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            tts_provider: env::var("TTS_PROVIDER")
                .unwrap_or_else(|_| "openai".to_string())
                .parse()?,
            openai_tts_model: env::var("OPENAI_TTS_MODEL")
                .unwrap_or_else(|_| "tts-1".to_string()),
            elevenlabs_api_key: non_empty_var("ELEVENLABS_API_KEY"),
            elevenlabs_model: env::var("ELEVENLABS_MODEL")
                .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            default_voice: non_empty_var("DEFAULT_VOICE"),
            default_wpm,
            default_preset: env::var("DEFAULT_PRESET")
                .unwrap_or_else(|_| "balanced".to_string())
                .parse()?,
            tavily_api_key: non_empty_var("TAVILY_API_KEY"),
            recent_hours: env::var("RECENT_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()?,
            max_fanout: env::var("MAX_FANOUT")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()?
                .max(1),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            bulletin_cache_enabled: env::var("BULLETIN_CACHE_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<String>()
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(true),
            cache_capacity: env::var("CACHE_CAPACITY")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "21600".to_string())
                .parse()?,
            job_capacity: env::var("JOB_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            job_ttl_secs: env::var("JOB_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,
        };

        if config.elevenlabs_api_key.is_none() && config.tts_provider == TtsProviderSetting::ElevenLabs {
            return Err("TTS_PROVIDER=elevenlabs requires ELEVENLABS_API_KEY".into());
        }

        Ok(config)
    }
}
