use super::types::*;
use crate::{
    Error,
    auth::{AuthProvider, MockAuthProvider},
    chat::ResponseGenerator,
    config::Config,
    history::{EmptyHistory, HistoryProvider},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "ai-medical-chatbot";
pub const GENERIC_ERROR: &str = "An error occurred while processing your request";

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<ResponseGenerator>,
    pub auth: Arc<dyn AuthProvider>,
    pub history: Arc<dyn HistoryProvider>,
}

impl AppState {
    pub fn new(config: Config, generator: ResponseGenerator) -> Self {
        Self {
            config: Arc::new(config),
            generator: Arc::new(generator),
            auth: Arc::new(MockAuthProvider::new()),
            history: Arc::new(EmptyHistory),
        }
    }

    pub fn from_config(config: Config) -> Self {
        let generator = ResponseGenerator::from_config(&config);
        Self::new(config, generator)
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryProvider>) -> Self {
        self.history = history;
        self
    }

    pub fn reject(&self, err: Error) -> ApiError {
        reject(err, self.config.server.debug)
    }
}

/// Maps an error to its status code and envelope. Raw error text is only
/// exposed for server-side failures when `debug` is set.
pub fn reject(err: Error, debug: bool) -> ApiError {
    match err {
        Error::InvalidInput(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                success: false,
                error: msg,
                details: None,
            }),
        ),
        Error::Unauthorized(msg) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                success: false,
                error: msg,
                details: None,
            }),
        ),
        other => {
            let details = if debug {
                other.to_string()
            } else {
                "Internal server error".to_string()
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: GENERIC_ERROR.to_string(),
                    details: Some(details),
                }),
            )
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected chat request body: {}", e.body_text());
        state.reject(Error::invalid_input("Message is required"))
    })?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| state.reject(Error::invalid_input("Message is required")))?;

    if message.is_empty() {
        return Err(state.reject(Error::invalid_input("Message cannot be empty")));
    }

    info!("Received chat message ({} chars)", message.chars().count());

    match state.generator.generate(message).await {
        Ok(reply) => {
            info!("Reply generated by {}", reply.model);
            Ok(Json(ChatResponse {
                success: true,
                response: reply.text,
                model: reply.model,
            }))
        }
        Err(e) => {
            error!("Failed to generate reply: {}", e);
            Err(state.reject(e))
        }
    }
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Medical Chatbot API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        environment: state.config.server.environment.clone(),
    })
}

pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = &state.config.models;

    let mut listed = vec![ModelInfo::from_config(&models.primary, "active")];
    listed.extend(
        models
            .fallback
            .iter()
            .map(|m| ModelInfo::from_config(m, "fallback")),
    );

    Json(ModelsResponse { models: listed })
}

pub async fn public_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;

    Json(ConfigResponse {
        environment: config.server.environment.clone(),
        features: Features {
            huggingface_integration: config.secrets.huggingface_token.is_some(),
            openai_integration: config.secrets.openai_api_key.is_some(),
            database_connected: config.secrets.postgres_url.is_some(),
        },
        limits: Limits {
            max_message_length: config.limits.max_message_length,
            rate_limit: config.limits.rate_limit.clone(),
        },
    })
}

impl ModelInfo {
    fn from_config(model: &crate::config::ModelConfig, status: &str) -> Self {
        Self {
            name: model.name.clone(),
            description: model.description.clone(),
            status: status.to_string(),
            use_case: model.use_case.clone(),
        }
    }
}
