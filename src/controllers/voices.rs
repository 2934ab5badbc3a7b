use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::voice::{VoiceService, VoiceServiceApi, VoicesResponse},
    error::AppResult,
};

pub struct VoiceController {
    voice_service: Arc<VoiceService>,
}

impl VoiceController {
    pub fn new(voice_service: Arc<VoiceService>) -> Self {
        Self { voice_service }
    }

    /// GET /api/voices - List the voices available for synthesis
    pub async fn list_voices(
        State(controller): State<Arc<VoiceController>>,
    ) -> AppResult<Json<VoicesResponse>> {
        let voices = controller.voice_service.list_voices().await?;
        Ok(Json(VoicesResponse {
            voices: voices.as_ref().clone(),
        }))
    }
}
