//! Placeholder account endpoints. Bearer credentials must be present but are
//! never validated.

use super::{
    handlers::{ApiError, ApiResult, AppState},
    types::*,
};
use crate::{
    Error,
    auth::{Credentials, TokenPair, UserProfile},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, warn};

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn bearer_token(state: &AppState, header: BearerHeader) -> std::result::Result<String, ApiError> {
    header
        .map(|TypedHeader(auth)| auth.token().to_string())
        .ok_or_else(|| state.reject(Error::unauthorized("Bearer token required")))
}

fn credentials(
    state: &AppState,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> std::result::Result<Credentials, ApiError> {
    payload.map(|Json(c)| c).map_err(|e| {
        warn!("Rejected credentials body: {}", e.body_text());
        state.reject(Error::invalid_input("Email and password are required"))
    })
}

pub async fn sign_up(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let credentials = credentials(&state, payload)?;
    let user = state
        .auth
        .sign_up(&credentials)
        .await
        .map_err(|e| state.reject(e))?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

pub async fn log_in(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let credentials = credentials(&state, payload)?;
    state
        .auth
        .log_in(&credentials)
        .await
        .map(Json)
        .map_err(|e| state.reject(e))
}

pub async fn google_auth_url(State(state): State<AppState>) -> ApiResult<AuthUrlResponse> {
    let url = state
        .auth
        .authorization_url()
        .await
        .map_err(|e| state.reject(e))?;
    Ok(Json(AuthUrlResponse { url }))
}

pub async fn me(State(state): State<AppState>, header: BearerHeader) -> ApiResult<UserProfile> {
    let token = bearer_token(&state, header)?;
    state
        .auth
        .current_user(&token)
        .await
        .map(Json)
        .map_err(|e| state.reject(e))
}

pub async fn list_chats(
    State(state): State<AppState>,
    header: BearerHeader,
) -> ApiResult<ChatsResponse> {
    let user = current_user(&state, header).await?;
    let chats = state
        .history
        .list_chats(&user.id)
        .await
        .map_err(|e| state.reject(e))?;

    debug!("Listing {} chat(s) for {}", chats.len(), user.id);
    Ok(Json(ChatsResponse { chats }))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    header: BearerHeader,
) -> ApiResult<ConversationsResponse> {
    let user = current_user(&state, header).await?;
    let conversations = state
        .history
        .list_conversations(&user.id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(ConversationsResponse { conversations }))
}

async fn current_user(
    state: &AppState,
    header: BearerHeader,
) -> std::result::Result<UserProfile, ApiError> {
    let token = bearer_token(state, header)?;
    state
        .auth
        .current_user(&token)
        .await
        .map_err(|e| state.reject(e))
}
