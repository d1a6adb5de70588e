use super::{lazy::LazyHandle, types::*};
use crate::{Error, Result, config::ModelConfig};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

pub const MISSING_TOKEN: &str = "HUGGINGFACE_TOKEN environment variable is not set";

/// A text completion backend. Returns the raw decoded sequence; reply
/// extraction is the caller's concern.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String>;

    /// Forces the lazy model handle to initialize.
    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }
}

/// Hugging Face hosted inference API.
pub struct HostedClient {
    endpoint: String,
    token: Option<SecretString>,
    http: LazyHandle<reqwest::Client>,
}

impl HostedClient {
    pub fn new(model: &ModelConfig, inference_url: &str, token: Option<SecretString>) -> Self {
        let endpoint = format!(
            "{}/models/{}",
            inference_url.trim_end_matches('/'),
            model.repo
        );

        Self {
            endpoint,
            token,
            http: LazyHandle::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn http(&self) -> Result<&reqwest::Client> {
        self.http
            .get_or_try_init(|| async {
                let token = self.token.as_ref().ok_or_else(|| Error::config(MISSING_TOKEN))?;

                let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| Error::config("HUGGINGFACE_TOKEN contains invalid characters"))?;
                auth.set_sensitive(true);

                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, auth);

                let client = reqwest::Client::builder()
                    .default_headers(headers)
                    .build()?;

                info!("Hosted inference client ready for {}", self.endpoint);
                Ok::<_, Error>(client)
            })
            .await
    }
}

#[async_trait]
impl CompletionClient for HostedClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let http = self.http().await?;

        debug!("Requesting hosted completion from {}", self.endpoint);

        let response = http
            .post(&self.endpoint)
            .json(&HostedRequest::new(prompt, params))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<HostedResponse> = serde_json::from_str(&body).ok();

        match (status.is_success(), parsed) {
            (true, Some(HostedResponse::Generations(mut generations))) => {
                if generations.is_empty() {
                    return Err(Error::generation("inference API returned no generations"));
                }
                Ok(generations.swap_remove(0).generated_text)
            }
            (true, Some(HostedResponse::Single(generated))) => Ok(generated.generated_text),
            (_, Some(HostedResponse::Failure { error })) => Err(Error::generation(format!(
                "inference API returned {}: {}",
                status, error
            ))),
            (true, _) => Err(Error::generation(format!(
                "unexpected inference API payload: {}",
                body
            ))),
            (false, _) => Err(Error::generation(format!(
                "inference API returned {}",
                status
            ))),
        }
    }

    async fn warm_up(&self) -> Result<()> {
        self.http().await.map(|_| ())
    }
}
