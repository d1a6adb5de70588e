use crate::{
    auth::UserProfile,
    history::{ChatSummary, Conversation},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub description: String,
    pub status: String,
    pub use_case: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub environment: String,
    pub features: Features,
    pub limits: Limits,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Features {
    pub huggingface_integration: bool,
    pub openai_integration: bool,
    pub database_connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Limits {
    pub max_message_length: usize,
    pub rate_limit: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatsResponse {
    pub chats: Vec<ChatSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}
