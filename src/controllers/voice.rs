use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::bulletin::{BulletinService, BulletinServiceApi};
use crate::domain::voice::VoiceProfile;

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceProfile>,
}

pub struct VoiceController {
    bulletin_service: Arc<BulletinService>,
}

impl VoiceController {
    pub fn new(bulletin_service: Arc<BulletinService>) -> Self {
        Self { bulletin_service }
    }

    /// GET /voices - Voices offered by the configured speech providers
    pub async fn list_voices(State(controller): State<Arc<VoiceController>>) -> Json<VoicesResponse> {
        Json(VoicesResponse {
            voices: controller.bulletin_service.voices(),
        })
    }
}
