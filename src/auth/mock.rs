use super::{AuthProvider, Credentials, TokenPair, UserProfile};
use crate::Result;
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
pub const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";
pub const MOCK_USER_EMAIL: &str = "demo@medibot.local";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth\
    ?client_id=mock-client-id&response_type=code&scope=openid%20email%20profile\
    &redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fgoogle%2Fcallback";

/// Accepts any credentials and any token.
#[derive(Debug, Default, Clone)]
pub struct MockAuthProvider;

impl MockAuthProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserProfile> {
        let (email, _) = credentials.require()?;
        debug!("Mock sign-up for {}", email);

        Ok(UserProfile {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        })
    }

    async fn log_in(&self, credentials: &Credentials) -> Result<TokenPair> {
        let (email, _) = credentials.require()?;
        debug!("Mock login for {}", email);

        Ok(TokenPair {
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            refresh_token: MOCK_REFRESH_TOKEN.to_string(),
            token_type: "bearer".to_string(),
        })
    }

    async fn authorization_url(&self) -> Result<String> {
        Ok(GOOGLE_AUTH_URL.to_string())
    }

    async fn current_user(&self, _token: &str) -> Result<UserProfile> {
        Ok(UserProfile {
            id: Uuid::nil().to_string(),
            email: MOCK_USER_EMAIL.to_string(),
        })
    }
}
