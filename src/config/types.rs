use secrecy::SecretString;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Populated from the environment only, never from the config file.
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Exposes raw error text in 500 responses.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_primary_model")]
    pub primary: ModelConfig,
    #[serde(default = "default_fallback_model")]
    pub fallback: Option<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Identifier reported to clients.
    pub name: String,
    /// Hugging Face repository id.
    pub repo: String,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Hosted,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_priming")]
    pub priming: String,
    #[serde(default = "default_user_label")]
    pub user_label: String,
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default)]
    pub extract: Extraction,
}

/// How the reply is located in the decoded output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extraction {
    /// Text after the last marker; empty when the marker is missing. Suits
    /// causal models whose output repeats the prompt.
    #[default]
    LastMarker,
    /// Text after the last marker, or the whole output when the marker is
    /// missing. Suits seq2seq models that only emit the answer.
    LastMarkerOrWhole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Upper bound on the whole sequence, prompt included.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Render generation failures as an apology reply with HTTP 200 instead of
    /// a 500 error envelope.
    #[serde(default)]
    pub embed_errors: bool,
    /// Load the primary model before accepting requests.
    #[serde(default)]
    pub preload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_inference_url")]
    pub inference_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: String,
}

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub huggingface_token: Option<SecretString>,
    pub openai_api_key: Option<SecretString>,
    pub postgres_url: Option<SecretString>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            debug: false,
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_model(),
            fallback: default_fallback_model(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            priming: default_priming(),
            user_label: default_user_label(),
            marker: default_marker(),
            extract: Extraction::default(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            do_sample: default_do_sample(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            inference_url: default_inference_url(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_length: default_max_message_length(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_primary_model() -> ModelConfig {
    ModelConfig {
        name: "BioGPT-Large".to_string(),
        repo: "microsoft/BioGPT-Large".to_string(),
        backend: Backend::Hosted,
        description: "Microsoft's biomedical language model".to_string(),
        use_case: "Medical question answering and advice".to_string(),
        prompt: PromptConfig::default(),
    }
}

fn default_fallback_model() -> Option<ModelConfig> {
    Some(ModelConfig {
        name: "Flan-T5-Large".to_string(),
        repo: "google/flan-t5-large".to_string(),
        backend: Backend::Hosted,
        description: "Google's T5 model fine-tuned for instruction following".to_string(),
        use_case: "General medical assistance".to_string(),
        prompt: PromptConfig {
            priming: "You are VIFA (Virtual First Aid), a helpful medical assistant. \
                      Your purpose is to provide accurate and safe medical advice, health tips, \
                      and first aid guidance. If unsure, always recommend consulting a licensed \
                      healthcare professional."
                .to_string(),
            user_label: default_user_label(),
            marker: "VIFA:".to_string(),
            extract: Extraction::LastMarkerOrWhole,
        },
    })
}

fn default_priming() -> String {
    "You are a helpful AI medical assistant specializing in healthcare. \
     Your purpose is to provide accurate and concise medical advice. \
     If unsure, recommend consulting a licensed healthcare professional."
        .to_string()
}

fn default_user_label() -> String {
    "User:".to_string()
}

fn default_marker() -> String {
    "Assistant:".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_do_sample() -> bool {
    true
}

fn default_inference_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_max_message_length() -> usize {
    1000
}

fn default_rate_limit() -> String {
    "10 requests per minute".to_string()
}
