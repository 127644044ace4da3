use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
};
use std::sync::Arc;

use crate::{
    domain::bulletin::{BulletinService, BulletinServiceApi},
    error::AppResult,
};

pub struct AudioController {
    bulletin_service: Arc<BulletinService>,
}

impl AudioController {
    pub fn new(bulletin_service: Arc<BulletinService>) -> Self {
        Self { bulletin_service }
    }

    /// GET /download/:name - Stream a stored bulletin
    pub async fn download(
        State(controller): State<Arc<AudioController>>,
        Path(name): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let wav = controller.bulletin_service.open_audio(&name).await?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(wav.len()));
        // The name was validated by the store, so it is a safe header value
        if let Ok(disposition) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name)) {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }

        Ok((StatusCode::OK, headers, Body::from(wav)))
    }
}
