use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::bulletin::{BulletinResponse, BulletinService, BulletinServiceApi, GenerateBulletinRequest},
    error::{AppError, AppResult},
};

pub struct BulletinController {
    bulletin_service: Arc<BulletinService>,
}

impl BulletinController {
    pub fn new(bulletin_service: Arc<BulletinService>) -> Self {
        Self { bulletin_service }
    }

    /// POST /generate - Collect sources, write a script and narrate it
    pub async fn generate(
        State(controller): State<Arc<BulletinController>>,
        payload: Result<Json<GenerateBulletinRequest>, JsonRejection>,
    ) -> AppResult<Json<BulletinResponse>> {
        let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let response = controller.bulletin_service.generate(request).await?;

        Ok(Json(response))
    }
}
