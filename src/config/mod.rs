mod types;

pub use types::*;

use crate::{Error, Result};
use secrecy::SecretString;
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads `CONFIG_PATH` (or `config.yaml`) and overlays the process environment.
///
/// A missing default file yields built-in defaults; a path named explicitly
/// through `CONFIG_PATH` must exist.
pub async fn load() -> Result<Config> {
    let (config_path, explicit) = match env::var("CONFIG_PATH") {
        Ok(path) => (path, true),
        Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
    };

    let mut config = if explicit || Path::new(&config_path).exists() {
        load_from(&config_path).await?
    } else {
        debug!("No {} found, using built-in defaults", config_path);
        Config::default()
    };

    config.apply_env(|key| env::var(key).ok());
    Ok(config)
}

/// Parses a YAML config file without touching the environment.
pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    parse(&config_str)
}

pub fn parse(yaml: &str) -> Result<Config> {
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Applies `PORT`, `DEBUG`, `ENVIRONMENT` and the secret variables on top of
    /// the file values. Empty variables count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = get("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(flag) = get("DEBUG") {
            self.server.debug = is_truthy(&flag);
        }
        if let Some(environment) = get("ENVIRONMENT") {
            self.server.environment = environment;
        }

        self.secrets = Secrets {
            huggingface_token: get("HUGGINGFACE_TOKEN").map(SecretString::new),
            openai_api_key: get("OPENAI_API_KEY").map(SecretString::new),
            postgres_url: get("POSTGRES_URL").map(SecretString::new),
        };
    }

    fn validate(&self) -> Result<()> {
        let mut models = vec![&self.models.primary];
        models.extend(self.models.fallback.as_ref());

        for model in models {
            if model.name.trim().is_empty() || model.repo.trim().is_empty() {
                return Err(Error::config("model entries need a name and a repo"));
            }
            if model.prompt.marker.trim().is_empty() {
                return Err(Error::config(format!(
                    "model '{}' has an empty reply marker",
                    model.name
                )));
            }
        }

        if self.sampling.max_length == 0 {
            return Err(Error::config("sampling.max_length must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sampling.top_p) {
            return Err(Error::config("sampling.top_p must be within [0, 1]"));
        }
        if self.sampling.temperature < 0.0 {
            return Err(Error::config("sampling.temperature must not be negative"));
        }

        Ok(())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
