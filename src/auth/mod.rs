//! Authentication capability. Only a placeholder implementation exists: it
//! issues static tokens and never validates them.

mod mock;

pub use mock::MockAuthProvider;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<UserProfile>;

    async fn log_in(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Where the browser should be sent to start a third-party sign-in.
    async fn authorization_url(&self) -> Result<String>;

    /// Resolves the user behind a bearer token.
    async fn current_user(&self, token: &str) -> Result<UserProfile>;
}

impl Credentials {
    /// Trimmed email and password, or an `InvalidInput` naming the first
    /// missing field.
    pub fn require(&self) -> Result<(&str, &str)> {
        let email = non_empty(self.email.as_deref())
            .ok_or_else(|| crate::Error::invalid_input("Email is required"))?;
        let password = non_empty(self.password.as_deref())
            .ok_or_else(|| crate::Error::invalid_input("Password is required"))?;
        Ok((email, password))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
