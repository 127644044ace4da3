pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::controllers::{
    audio::AudioController, bulletin::BulletinController, health, job::JobController, metrics,
    voice::VoiceController,
};
use crate::domain::bulletin::BulletinService;
use crate::infrastructure::config::Config;
use crate::infrastructure::jobs::JobRegistry;

/// All routes, wired to one bulletin service and its background job registry
pub fn build_router(bulletin_service: Arc<BulletinService>, jobs: Arc<JobRegistry>) -> Router {
    let bulletin_controller = Arc::new(BulletinController::new(bulletin_service.clone()));
    let job_controller = Arc::new(JobController::new(bulletin_service.clone(), jobs));
    let audio_controller = Arc::new(AudioController::new(bulletin_service.clone()));
    let voice_controller = Arc::new(VoiceController::new(bulletin_service.clone()));

    let bulletin_routes = Router::new()
        .route("/generate", post(BulletinController::generate))
        .with_state(bulletin_controller);

    let job_routes = Router::new()
        .route("/generate/async", post(JobController::start))
        .route("/progress/:id", get(JobController::progress))
        .route("/result/:id", get(JobController::result))
        .with_state(job_controller);

    let audio_routes = Router::new()
        .route("/download/:name", get(AudioController::download))
        .with_state(audio_controller);

    let voice_routes = Router::new()
        .route("/voices", get(VoiceController::list_voices))
        .with_state(voice_controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .route("/metrics", get(metrics::metrics))
        .route("/performance", get(metrics::performance))
        .with_state(bulletin_service)
        .merge(bulletin_routes)
        .merge(job_routes)
        .merge(audio_routes)
        .merge(voice_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware)),
        )
        .layer(cors)
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(config: Arc<Config>, app: Router) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
