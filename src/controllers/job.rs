use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    domain::bulletin::{
        BulletinResponse, BulletinService, BulletinServiceApi, BulletinServiceError, GenerateBulletinRequest,
    },
    error::{AppError, AppResult},
    infrastructure::jobs::{JobFailure, JobProgress, JobRegistry, JobSnapshot, JobStatus},
};

#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress_url: String,
    pub result_url: String,
}

pub struct JobController {
    bulletin_service: Arc<BulletinService>,
    jobs: Arc<JobRegistry>,
}

impl JobController {
    pub fn new(bulletin_service: Arc<BulletinService>, jobs: Arc<JobRegistry>) -> Self {
        Self { bulletin_service, jobs }
    }

    /// POST /generate/async - Validate, then generate in the background
    pub async fn start(
        State(controller): State<Arc<JobController>>,
        payload: Result<Json<GenerateBulletinRequest>, JsonRejection>,
    ) -> AppResult<(StatusCode, Json<JobAccepted>)> {
        let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        controller.bulletin_service.validate(&request)?;

        let job = controller.jobs.create().await;
        let id = job.id;
        let service = controller.bulletin_service.clone();
        let jobs = controller.jobs.clone();

        tokio::spawn(
            async move {
                let progress = JobProgress::new(jobs.clone(), id);
                match service.generate_with_progress(request, &progress).await {
                    Ok(response) => {
                        tracing::info!(bulletin_id = %response.id, "Background generation finished");
                        jobs.complete(id, response).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Background generation failed");
                        jobs.fail(id, failure_of(e)).await;
                    }
                }
            }
            .instrument(tracing::info_span!("bulletin_job", job_id = %id)),
        );

        Ok((
            StatusCode::ACCEPTED,
            Json(JobAccepted {
                job_id: id,
                status: job.status,
                progress_url: format!("/progress/{}", id),
                result_url: format!("/result/{}", id),
            }),
        ))
    }

    /// GET /progress/:id - Stage and percentage of a background generation
    pub async fn progress(
        State(controller): State<Arc<JobController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<JobSnapshot>> {
        Ok(Json(controller.find(&id).await?))
    }

    /// GET /result/:id - The finished bulletin, or the error that stopped it
    pub async fn result(
        State(controller): State<Arc<JobController>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<BulletinResponse>> {
        let job = controller.find(&id).await?;
        match (job.status, job.result, job.error) {
            (JobStatus::Completed, Some(response), _) => Ok(Json(response)),
            (JobStatus::Failed, _, Some(failure)) => Err(match failure.dependency {
                Some(dependency) => AppError::Dependency {
                    dependency,
                    message: failure.message,
                },
                None => AppError::Internal(failure.message),
            }),
            _ => Err(AppError::Conflict(format!(
                "job {} is not complete ({}%)",
                job.id, job.progress_percent
            ))),
        }
    }

    async fn find(&self, raw_id: &str) -> AppResult<JobSnapshot> {
        let not_found = || AppError::NotFound(format!("job {}", raw_id));
        let id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
        self.jobs.get(&id).await.ok_or_else(not_found)
    }
}

fn failure_of(err: BulletinServiceError) -> JobFailure {
    match err {
        BulletinServiceError::Dependency { dependency, message } => JobFailure {
            message,
            dependency: Some(dependency.to_string()),
        },
        other => JobFailure {
            message: other.to_string(),
            dependency: None,
        },
    }
}
