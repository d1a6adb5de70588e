use async_trait::async_trait;
use medibot::{
    Error, Result,
    chat::{PromptTemplate, ResponseGenerator},
    config::Config,
    llm::{CompletionClient, SamplingParams},
};
use mockall::{Sequence, mock, predicate::*};
use pretty_assertions::assert_eq;
use std::sync::Arc;

mock! {
    pub Completion {}

    #[async_trait]
    impl CompletionClient for Completion {
        async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String>;
        async fn warm_up(&self) -> Result<()>;
    }
}

fn vifa_template() -> PromptTemplate {
    let fallback = Config::default().models.fallback.unwrap();
    PromptTemplate::from(&fallback.prompt)
}

#[tokio::test]
async fn test_primary_prompt_is_role_primed() {
    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .withf(|prompt, _| {
            prompt.starts_with("You are a helpful AI medical assistant specializing in healthcare.")
                && prompt.contains("If unsure, recommend consulting a licensed healthcare professional.\n")
                && prompt.ends_with("\nUser: Is 42 a symptom?\nAssistant:")
        })
        .times(1)
        .returning(|prompt, _| {
            Ok(format!("{} 42 is not a symptom.\nAssistant: See a doctor.", prompt))
        });

    let generator = ResponseGenerator::new(SamplingParams::default()).with_model(
        "BioGPT-Large",
        PromptTemplate::default(),
        Arc::new(primary),
    );

    let reply = generator.generate("Is 42 a symptom?").await.unwrap();
    assert_eq!(reply.text, "See a doctor.");
    assert_eq!(reply.model, "BioGPT-Large");
}

#[tokio::test]
async fn test_fallback_tried_after_primary_failure() {
    let mut seq = Sequence::new();

    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(Error::generation("503 Service Unavailable")));

    let mut fallback = MockCompletion::new();
    fallback
        .expect_complete()
        .withf(|prompt, _| prompt.starts_with("You are VIFA (Virtual First Aid)") && prompt.ends_with("\nVIFA:"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|prompt, _| Ok(format!("{} Apply a cold compress.", prompt)));

    let generator = ResponseGenerator::new(SamplingParams::default())
        .with_model("BioGPT-Large", PromptTemplate::default(), Arc::new(primary))
        .with_model("Flan-T5-Large", vifa_template(), Arc::new(fallback));

    let reply = generator.generate("sprained ankle").await.unwrap();
    assert_eq!(reply.text, "Apply a cold compress.");
    assert_eq!(reply.model, "Flan-T5-Large");
}

#[tokio::test]
async fn test_configuration_error_skips_fallback() {
    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .times(1)
        .returning(|_, _| Err(Error::config("HUGGINGFACE_TOKEN environment variable is not set")));

    let mut fallback = MockCompletion::new();
    fallback.expect_complete().never();

    let generator = ResponseGenerator::new(SamplingParams::default())
        .with_model("BioGPT-Large", PromptTemplate::default(), Arc::new(primary))
        .with_model("Flan-T5-Large", vifa_template(), Arc::new(fallback));

    let err = generator.generate("hi").await.unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_all_models_failing_reports_last_error() {
    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .returning(|_, _| Err(Error::generation("primary down")));
    let mut fallback = MockCompletion::new();
    fallback
        .expect_complete()
        .returning(|_, _| Err(Error::generation("fallback down")));

    let generator = ResponseGenerator::new(SamplingParams::default())
        .with_model("BioGPT-Large", PromptTemplate::default(), Arc::new(primary))
        .with_model("Flan-T5-Large", vifa_template(), Arc::new(fallback));

    let err = generator.generate("hi").await.unwrap_err();
    assert_eq!(err.to_string(), "Generation failed: fallback down");
}

#[tokio::test]
async fn test_embedded_failure_is_attributed_to_primary() {
    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .returning(|_, _| Err(Error::generation("primary down")));

    let generator = ResponseGenerator::new(SamplingParams::default())
        .with_model("BioGPT-Large", PromptTemplate::default(), Arc::new(primary))
        .embed_errors(true);

    let reply = generator.generate("hi").await.unwrap();
    assert_eq!(reply.model, "BioGPT-Large");
    assert_eq!(
        reply.text,
        "Sorry, an error occurred while generating a response. Please try again later \
         or contact support. Error details: primary down"
    );
}

#[tokio::test]
async fn test_sampling_params_are_forwarded() {
    let params = SamplingParams {
        max_length: 128,
        temperature: 0.3,
        top_p: 0.8,
        do_sample: true,
    };

    let mut primary = MockCompletion::new();
    primary
        .expect_complete()
        .with(always(), eq(params))
        .times(1)
        .returning(|_, _| Ok("Assistant: ok".to_string()));

    let generator = ResponseGenerator::new(params).with_model(
        "BioGPT-Large",
        PromptTemplate::default(),
        Arc::new(primary),
    );

    assert_eq!(generator.generate("hi").await.unwrap().text, "ok");
}

#[tokio::test]
async fn test_preload_warms_only_primary() {
    let mut primary = MockCompletion::new();
    primary.expect_warm_up().times(1).returning(|| Ok(()));
    let mut fallback = MockCompletion::new();
    fallback.expect_warm_up().never();

    let generator = ResponseGenerator::new(SamplingParams::default())
        .with_model("BioGPT-Large", PromptTemplate::default(), Arc::new(primary))
        .with_model("Flan-T5-Large", vifa_template(), Arc::new(fallback));

    generator.preload().await.unwrap();
    assert_eq!(generator.primary_model(), Some("BioGPT-Large"));
}

#[test]
fn test_generator_from_default_config_uses_biogpt_as_primary() {
    let generator = ResponseGenerator::from_config(&Config::default());
    assert_eq!(generator.primary_model(), Some("BioGPT-Large"));
}
