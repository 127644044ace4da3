use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

use newscast_backend::domain::bulletin::{BulletinService, Preset};
use newscast_backend::domain::sources::SourceCollector;
use newscast_backend::domain::voice::{build_detector, TimingProfile, VoiceSynthesizer};
use newscast_backend::infrastructure::cache::{BulletinCache, MokaBulletinCache};
use newscast_backend::infrastructure::http::build_router;
use newscast_backend::infrastructure::jobs::JobRegistry;
use newscast_backend::infrastructure::repositories::{LanguageModelRepository, NewsRepository, TtsRepository};
use newscast_backend::infrastructure::storage::AudioStore;

pub mod api_client;
pub mod stubs;

use api_client::TestClient;
use stubs::{MetronomeSpeech, ObedientModel, StubNews};

/// The collaborators an app instance is wired with
pub struct Stubs {
    pub news: Arc<StubNews>,
    pub model: Arc<ObedientModel>,
    pub speech: Arc<MetronomeSpeech>,
    pub cache_enabled: bool,
}

impl Default for Stubs {
    fn default() -> Self {
        Self {
            news: StubNews::new(3),
            model: ObedientModel::new(),
            speech: MetronomeSpeech::new(),
            cache_enabled: false,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub news: Arc<StubNews>,
    pub model: Arc<ObedientModel>,
    pub speech: Arc<MetronomeSpeech>,
    pub data_dir: TempDir,
}

impl TestContext {
    /// Spawn the full router on an ephemeral port
    pub async fn with_stubs(stubs: Stubs) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let news: Arc<dyn NewsRepository> = stubs.news.clone();
        let collector = Arc::new(SourceCollector::new(vec![news], 24, 4));

        let llm: Arc<dyn LanguageModelRepository> = stubs.model.clone();

        let speech: Arc<dyn TtsRepository> = stubs.speech.clone();
        let synthesizer = Arc::new(VoiceSynthesizer::new(
            vec![speech],
            None,
            TimingProfile::new(150.0).expect("valid wpm"),
        ));

        let store = Arc::new(
            AudioStore::new(data_dir.path().to_path_buf())
                .await
                .expect("Failed to create audio store"),
        );

        let cache: Option<Arc<dyn BulletinCache>> = if stubs.cache_enabled {
            Some(Arc::new(MokaBulletinCache::new(10, Duration::from_secs(60))))
        } else {
            None
        };

        let service = Arc::new(BulletinService::new(
            collector,
            llm,
            synthesizer,
            store,
            cache,
            build_detector(),
            Preset::Balanced,
        ));
        let jobs = Arc::new(JobRegistry::new(10, Duration::from_secs(60)));
        let app = build_router(service, jobs);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            client: TestClient::new(&base_url),
            news: stubs.news,
            model: stubs.model,
            speech: stubs.speech,
            data_dir,
        }
    }

    pub async fn new() -> Self {
        Self::with_stubs(Stubs::default()).await
    }

    /// Number of WAV files currently stored
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.data_dir.path())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().ends_with(".wav"))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        Self::new()
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The temp data dir is removed on drop
        }
    }
}
