use crate::config::SamplingConfig;
use serde::{Deserialize, Serialize};

/// Decoding policy applied to every generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Token budget. The local backend counts the whole sequence, prompt
    /// included; the hosted API only accepts a new-token limit and receives
    /// this value as `max_new_tokens`.
    pub max_length: usize,
    pub temperature: f64,
    pub top_p: f64,
    pub do_sample: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from(&SamplingConfig::default())
    }
}

impl From<&SamplingConfig> for SamplingParams {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            max_length: config.max_length,
            temperature: config.temperature,
            top_p: config.top_p,
            do_sample: config.do_sample,
        }
    }
}

impl SamplingParams {
    /// Temperature handed to the sampler; `None` selects greedy decoding.
    pub fn effective_temperature(&self) -> Option<f64> {
        if self.do_sample && self.temperature > 0.0 {
            Some(self.temperature)
        } else {
            None
        }
    }

    pub fn effective_top_p(&self) -> Option<f64> {
        if self.do_sample && self.top_p > 0.0 && self.top_p < 1.0 {
            Some(self.top_p)
        } else {
            None
        }
    }
}

/// Body of a text-generation call against the hosted inference API.
#[derive(Debug, Clone, Serialize)]
pub struct HostedRequest<'a> {
    pub inputs: &'a str,
    pub parameters: HostedParameters,
    pub options: HostedOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostedParameters {
    /// `SamplingParams::max_length` as is; the prompt is not subtracted.
    pub max_new_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub do_sample: bool,
    /// Echo the prompt so the decoded text has the same shape as a causal
    /// model's full output sequence.
    pub return_full_text: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostedOptions {
    pub wait_for_model: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HostedResponse {
    Generations(Vec<GeneratedText>),
    Single(GeneratedText),
    Failure { error: String },
}

impl<'a> HostedRequest<'a> {
    pub fn new(prompt: &'a str, params: &SamplingParams) -> Self {
        Self {
            inputs: prompt,
            parameters: HostedParameters {
                max_new_tokens: params.max_length,
                temperature: params.effective_temperature(),
                top_p: params.effective_top_p(),
                do_sample: params.do_sample,
                return_full_text: true,
            },
            options: HostedOptions {
                wait_for_model: true,
            },
        }
    }
}
