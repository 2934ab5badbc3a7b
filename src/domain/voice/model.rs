use serde::{Deserialize, Serialize};

/// One entry of the provider's voice catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub gender: String,
}

/// Response for GET /api/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}
