mod prompt;

pub use prompt::{PromptTemplate, extract_reply};

use crate::{
    Error, Result,
    config::Config,
    llm::{CompletionClient, SamplingParams, create_client},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Text returned to the client together with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub model: String,
}

struct ModelRoute {
    name: String,
    template: PromptTemplate,
    client: Arc<dyn CompletionClient>,
}

/// Builds role-primed prompts, runs them through the configured models in
/// order (primary first) and extracts the assistant reply.
pub struct ResponseGenerator {
    routes: Vec<ModelRoute>,
    sampling: SamplingParams,
    embed_errors: bool,
}

impl ResponseGenerator {
    pub fn new(sampling: SamplingParams) -> Self {
        Self {
            routes: Vec::new(),
            sampling,
            embed_errors: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut generator = Self::new(SamplingParams::from(&config.sampling))
            .embed_errors(config.generation.embed_errors);

        let mut models = vec![&config.models.primary];
        models.extend(config.models.fallback.as_ref());

        for model in models {
            generator = generator.with_model(
                model.name.clone(),
                PromptTemplate::from(&model.prompt),
                create_client(model, config),
            );
        }

        info!(
            "Response generator configured with {} model(s)",
            generator.routes.len()
        );
        generator
    }

    /// Appends a model; the first one added is the primary.
    pub fn with_model(
        mut self,
        name: impl Into<String>,
        template: PromptTemplate,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        self.routes.push(ModelRoute {
            name: name.into(),
            template,
            client,
        });
        self
    }

    /// Render generation failures as a reply instead of an error.
    pub fn embed_errors(mut self, enabled: bool) -> Self {
        self.embed_errors = enabled;
        self
    }

    pub fn primary_model(&self) -> Option<&str> {
        self.routes.first().map(|r| r.name.as_str())
    }

    /// Initializes the primary model handle ahead of the first request.
    pub async fn preload(&self) -> Result<()> {
        let route = self
            .routes
            .first()
            .ok_or_else(|| Error::config("no models configured"))?;
        info!("Preloading model {}", route.name);
        route.client.warm_up().await
    }

    pub async fn generate(&self, message: &str) -> Result<Reply> {
        let primary = self
            .routes
            .first()
            .ok_or_else(|| Error::config("no models configured"))?;

        let mut last_error = None;

        for route in &self.routes {
            let prompt = route.template.render(message);
            debug!("Generating with {} ({} prompt bytes)", route.name, prompt.len());

            match route.client.complete(&prompt, &self.sampling).await {
                Ok(decoded) => {
                    let text = route.template.extract_reply(&decoded);
                    if text.is_empty() {
                        warn!("Model {} produced no text after the reply marker", route.name);
                    }
                    return Ok(Reply {
                        text,
                        model: route.name.clone(),
                    });
                }
                Err(e) if e.is_config() => {
                    error!("Model {} is misconfigured: {}", route.name, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Model {} failed: {}", route.name, e);
                    last_error = Some(match e {
                        Error::Generation(msg) => msg,
                        other => other.to_string(),
                    });
                }
            }
        }

        let cause = last_error.unwrap_or_else(|| "no model produced a response".to_string());

        if self.embed_errors {
            return Ok(Reply {
                text: apology(&cause),
                model: primary.name.clone(),
            });
        }

        Err(Error::generation(cause))
    }
}

fn apology(cause: &str) -> String {
    format!(
        "Sorry, an error occurred while generating a response. \
         Please try again later or contact support. Error details: {}",
        cause
    )
}
