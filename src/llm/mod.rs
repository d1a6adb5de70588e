pub mod client;
mod lazy;
pub mod local;
pub mod types;

pub use client::{CompletionClient, HostedClient};
pub use lazy::LazyHandle;
pub use local::LocalClient;
pub use types::*;

use crate::config::{Backend, Config, ModelConfig};
use std::sync::Arc;

/// Builds the completion client for one configured model. Nothing is loaded
/// or contacted until the first call.
pub fn create_client(model: &ModelConfig, config: &Config) -> Arc<dyn CompletionClient> {
    let token = config.secrets.huggingface_token.clone();

    match model.backend {
        Backend::Hosted => Arc::new(HostedClient::new(model, &config.hub.inference_url, token)),
        Backend::Local => Arc::new(LocalClient::new(model, token)),
    }
}
