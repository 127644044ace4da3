use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::bulletin::{BulletinResponse, GenerationStep, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Why a background generation stopped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFailure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
}

/// Current state of a background generation, as served by GET /progress/:id
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub status: JobStatus,
    pub step: GenerationStep,
    pub progress_percent: u8,
    pub current_step: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
    /// Served separately by GET /result/:id
    #[serde(skip)]
    pub result: Option<BulletinResponse>,
}

impl JobSnapshot {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        let step = GenerationStep::Queued;
        Self {
            id,
            status: JobStatus::Pending,
            step,
            progress_percent: step.percent(),
            current_step: step.description().to_string(),
            created_at: now,
            updated_at: now,
            error: None,
            result: None,
        }
    }

    fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Background generations keyed by job id. Entries expire after the TTL
/// whether or not anyone collected the result.
pub struct JobRegistry {
    jobs: Cache<Uuid, JobSnapshot>,
}

impl JobRegistry {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            jobs: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
        }
    }

    pub async fn create(&self) -> JobSnapshot {
        let job = JobSnapshot::new(Uuid::new_v4());
        self.jobs.insert(job.id, job.clone()).await;
        tracing::debug!(job_id = %job.id, "Job created");
        job
    }

    pub async fn get(&self, id: &Uuid) -> Option<JobSnapshot> {
        self.jobs.get(id).await
    }

    pub async fn advance(&self, id: Uuid, step: GenerationStep) {
        self.update(id, |job| {
            job.status = JobStatus::Running;
            job.step = step;
            job.progress_percent = step.percent();
            job.current_step = step.description().to_string();
        })
        .await;
    }

    pub async fn complete(&self, id: Uuid, response: BulletinResponse) {
        self.update(id, |job| {
            let step = GenerationStep::Completed;
            job.status = JobStatus::Completed;
            job.step = step;
            job.progress_percent = step.percent();
            job.current_step = step.description().to_string();
            job.result = Some(response);
        })
        .await;
    }

    pub async fn fail(&self, id: Uuid, failure: JobFailure) {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.current_step = format!("Failed: {}", failure.message);
            job.error = Some(failure);
        })
        .await;
    }

    /// Each job has a single writer, its own task, so read-modify-write is safe.
    /// Finished jobs are frozen.
    async fn update(&self, id: Uuid, apply: impl FnOnce(&mut JobSnapshot)) {
        let Some(mut job) = self.jobs.get(&id).await else {
            tracing::warn!(job_id = %id, "Progress for an unknown or expired job");
            return;
        };
        if job.is_finished() {
            return;
        }
        apply(&mut job);
        job.updated_at = Utc::now();
        self.jobs.insert(id, job).await;
    }
}

/// Forwards pipeline stages of one generation into the registry
pub struct JobProgress {
    registry: Arc<JobRegistry>,
    id: Uuid,
}

impl JobProgress {
    pub fn new(registry: Arc<JobRegistry>, id: Uuid) -> Self {
        Self { registry, id }
    }
}

#[async_trait]
impl ProgressSink for JobProgress {
    async fn report(&self, step: GenerationStep) {
        tracing::debug!(job_id = %self.id, step = ?step, percent = step.percent(), "Job progress");
        self.registry.advance(self.id, step).await;
    }
}
