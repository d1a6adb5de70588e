use super::{
    client::{CompletionClient, MISSING_TOKEN},
    lazy::LazyHandle,
    types::SamplingParams,
};
use crate::{Error, Result, config::ModelConfig};
use async_trait::async_trait;
use candle::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::{
    generation::LogitsProcessor,
    models::mistral::{Config as MistralConfig, Model as Mistral},
};
use hf_hub::{
    Repo, RepoType,
    api::sync::{ApiBuilder, ApiRepo},
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::BTreeSet,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

/// Causal language model executed in-process with candle.
///
/// The checkpoint must use the Mistral/Llama decoder layout. Weights are
/// fetched from the Hugging Face hub on first use and kept for the lifetime
/// of the process.
pub struct LocalClient {
    repo: String,
    token: Option<SecretString>,
    handle: LazyHandle<Arc<ModelHandle>>,
}

struct ModelHandle {
    model: Mutex<Mistral>,
    tokenizer: Tokenizer,
    device: Device,
    eos_token: Option<u32>,
}

impl LocalClient {
    pub fn new(model: &ModelConfig, token: Option<SecretString>) -> Self {
        Self {
            repo: model.repo.clone(),
            token,
            handle: LazyHandle::new(),
        }
    }

    async fn handle(&self) -> Result<Arc<ModelHandle>> {
        self.handle
            .get_or_try_init(|| async {
                let token = self
                    .token
                    .as_ref()
                    .ok_or_else(|| Error::config(MISSING_TOKEN))?
                    .expose_secret()
                    .clone();
                let repo = self.repo.clone();

                info!("Loading {} for local inference", repo);
                let handle = tokio::task::spawn_blocking(move || ModelHandle::load(&repo, token))
                    .await
                    .map_err(|e| Error::internal(format!("model loading task failed: {}", e)))??;

                Ok::<_, Error>(Arc::new(handle))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl CompletionClient for LocalClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let handle = self.handle().await?;
        let prompt = prompt.to_string();
        let params = *params;

        tokio::task::spawn_blocking(move || handle.generate(&prompt, &params, rand::random()))
            .await
            .map_err(|e| Error::internal(format!("generation task failed: {}", e)))?
    }

    async fn warm_up(&self) -> Result<()> {
        self.handle().await.map(|_| ())
    }
}

impl ModelHandle {
    fn load(repo_id: &str, token: String) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_token(Some(token))
            .with_progress(false)
            .build()?;
        let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

        let tokenizer_path = repo.get("tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::generation(format!("tokenizer error: {}", e)))?;

        let config_path = repo.get("config.json")?;
        let cfg: MistralConfig = serde_json::from_slice(&fs::read(&config_path)?)?;

        let shards = weight_files(&repo)?;
        debug!("{} weight shard(s) for {}", shards.len(), repo_id);

        let device = Device::cuda_if_available(0)?;
        let dtype = if device.is_cuda() {
            DType::F16
        } else {
            DType::F32
        };

        // SAFETY: the hub cache files are not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&shards, dtype, &device)? };
        let model = Mistral::new(&cfg, vb)?;

        let eos_token = ["</s>", "<|endoftext|>", "<eos>"]
            .iter()
            .find_map(|t| tokenizer.token_to_id(t));

        info!("Model {} loaded on {:?}", repo_id, device);

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            eos_token,
        })
    }

    /// Samples until EOS or until the sequence reaches `max_length` tokens,
    /// then decodes the whole sequence (prompt included) without special
    /// tokens.
    fn generate(&self, prompt: &str, params: &SamplingParams, seed: u64) -> Result<String> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::generation(format!("tokenizer encode error: {}", e)))?;
        let mut tokens = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();
        let budget = generation_budget(prompt_len, params.max_length);
        debug!("Up to {} new token(s) for this prompt", budget);

        let mut sampler = LogitsProcessor::new(
            seed,
            params.effective_temperature(),
            params.effective_top_p(),
        );

        {
            let mut model = self
                .model
                .lock()
                .map_err(|_| Error::internal("model lock poisoned"))?;
            model.clear_kv_cache();

            let mut offset = 0usize;
            for _ in 0..budget {
                let context = if offset == 0 {
                    &tokens[..]
                } else {
                    &tokens[tokens.len() - 1..]
                };

                let input = Tensor::new(context, &self.device)?.unsqueeze(0)?;
                let out = model.forward(&input, offset)?;
                let seq_len = out.dim(1)?;
                let logits = out.i((0, seq_len - 1))?.to_dtype(DType::F32)?;
                offset += context.len();

                let next = sampler.sample(&logits)?;
                tokens.push(next);

                if Some(next) == self.eos_token {
                    break;
                }
            }
        }

        debug!(
            "Generated {} token(s) after a {}-token prompt",
            tokens.len() - prompt_len,
            prompt_len
        );

        self.tokenizer
            .decode(&tokens, true)
            .map_err(|e| Error::generation(format!("tokenizer decode error: {}", e)))
    }
}

/// New tokens left once the prompt is counted against `max_length`.
fn generation_budget(prompt_len: usize, max_length: usize) -> usize {
    let budget = max_length.saturating_sub(prompt_len);
    if budget == 0 {
        warn!(
            "Prompt is {} tokens, at or above max_length {}; nothing will be generated",
            prompt_len, max_length
        );
    }
    budget
}

fn weight_files(repo: &ApiRepo) -> Result<Vec<PathBuf>> {
    let index_path = match repo.get("model.safetensors.index.json") {
        Ok(path) => path,
        Err(_) => return Ok(vec![repo.get("model.safetensors")?]),
    };

    let index: serde_json::Value = serde_json::from_slice(&fs::read(&index_path)?)?;
    let files: BTreeSet<&str> = index["weight_map"]
        .as_object()
        .ok_or_else(|| Error::generation("safetensors index has no weight_map"))?
        .values()
        .filter_map(|v| v.as_str())
        .collect();

    files
        .into_iter()
        .map(|file| repo.get(file).map_err(Error::from))
        .collect()
}
