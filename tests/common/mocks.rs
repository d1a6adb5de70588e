use async_trait::async_trait;
use medibot::{
    Error, Result,
    llm::{CompletionClient, SamplingParams},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock completion client for testing
#[derive(Debug)]
pub struct MockCompletionClient {
    pub responses: Arc<Mutex<Vec<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub params: Arc<Mutex<Vec<SamplingParams>>>,
    pub error: Option<MockFailure>,
    pub repeat_last: bool,
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub enum MockFailure {
    Generation(String),
    Config(String),
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            params: Arc::new(Mutex::new(Vec::new())),
            error: None,
            repeat_last: false,
            delay: None,
        }
    }

    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        *self.responses.lock().unwrap() = responses.into_iter().map(str::to_string).collect();
        self
    }

    /// Answers every call with the same decoded text.
    pub fn always(text: &str) -> Self {
        let mut mock = Self::new().with_responses(vec![text]);
        mock.repeat_last = true;
        mock
    }

    pub fn failing(error: &str) -> Self {
        let mut mock = Self::new();
        mock.error = Some(MockFailure::Generation(error.to_string()));
        mock
    }

    pub fn misconfigured(error: &str) -> Self {
        let mut mock = Self::new();
        mock.error = Some(MockFailure::Config(error.to_string()));
        mock
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.params.lock().unwrap().push(*params);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.error {
            Some(MockFailure::Generation(msg)) => return Err(Error::generation(msg.clone())),
            Some(MockFailure::Config(msg)) => return Err(Error::config(msg.clone())),
            None => {}
        }

        let mut responses = self.responses.lock().unwrap();
        if self.repeat_last && responses.len() == 1 {
            return Ok(responses[0].clone());
        }
        if responses.is_empty() {
            return Err(Error::generation("No more mock responses available"));
        }

        Ok(responses.remove(0))
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded text shaped like a causal model's output: the prompt followed by
/// the continuation.
pub fn decoded_with_reply(message: &str, reply: &str) -> String {
    format!(
        "You are a helpful AI medical assistant.\nUser: {}\nAssistant: {}",
        message, reply
    )
}
