//! Integration tests for natural language command extraction

use nlp_agent::command::{CommandExtractor, RejectionReason};
use nlp_agent::core::config::ExtractorConfig;
use nlp_agent::core::types::{Axis, Direction};
use nlp_agent::nlp::ScriptedModels;
use proptest::prelude::*;

const LOWER_B125: &str = "Please, lower by 0.2 m the height of beam B125";
const RAISE_B200: &str = "raise the beam B200 by 1.5 m";
const WEATHER: &str = "the weather is nice today";
const NO_TARGET: &str = "please move something by 0.2 m";
const NO_MAGNITUDE: &str = "please lower beam B125";

/// Models behaving like the hosted zero-shot and QA models on the sample instructions
fn sample_models() -> ScriptedModels {
    ScriptedModels::new()
        // "Please, lower by 0.2 m the height of beam B125"
        .with_scores(LOWER_B125, &[("request", 0.97), ("beam", 0.88), ("slab", 0.07)])
        .with_answer("Which is the beam?", LOWER_B125, "B125")
        .with_answer("What should we do with the beam B125?", LOWER_B125, "lower by 0.2 m")
        .with_scores("lower by 0.2 m", &[("down", 0.79), ("back", 0.09), ("up", 0.05)])
        .with_answer("By how much?", "lower by 0.2 m", "0.2 m")
        .with_answer("number", "0.2 m", "0.2")
        // "raise the beam B200 by 1.5 m"
        .with_scores(RAISE_B200, &[("request", 0.93), ("beam", 0.95)])
        .with_answer("Which is the beam?", RAISE_B200, "B200")
        .with_answer("What should we do with the beam B200?", RAISE_B200, "raise the beam B200 by 1.5 m")
        .with_scores(RAISE_B200, &[("up", 0.84), ("front", 0.06)])
        .with_answer("By how much?", RAISE_B200, "1.5 m")
        .with_answer("number", "1.5 m", "1.5")
        // "the weather is nice today"
        .with_scores(WEATHER, &[("request", 0.08)])
        // "please move something by 0.2 m"
        .with_scores(NO_TARGET, &[("request", 0.91), ("beam", 0.22), ("wall", 0.25)])
        // "please lower beam B125"
        .with_scores(NO_MAGNITUDE, &[("request", 0.95), ("beam", 0.9)])
        .with_answer("Which is the beam?", NO_MAGNITUDE, "B125")
        .with_answer("What should we do with the beam B125?", NO_MAGNITUDE, "lower")
        .with_scores("lower", &[("down", 0.86)])
}

fn extractor() -> CommandExtractor<ScriptedModels> {
    CommandExtractor::new(ExtractorConfig::default(), sample_models()).unwrap()
}

/// Test 1: The canonical change request becomes a complete command
#[tokio::test]
async fn test_lower_beam_b125() {
    let extractor = extractor();
    let command = extractor.extract(LOWER_B125).await.unwrap();

    assert_eq!(command.target_id(), "B125");
    assert_eq!(command.axis(), Axis::Z);
    assert_eq!(command.direction(), Direction::Down);
    assert_eq!(command.magnitude(), 0.2);
    assert_eq!(command.unit(), "m");
}

/// Test 2: Raising maps to up along Z
#[tokio::test]
async fn test_raise_beam_b200() {
    let extractor = extractor();
    let command = extractor.extract(RAISE_B200).await.unwrap();

    assert_eq!(command.target_id(), "B200");
    assert_eq!(command.axis(), Axis::Z);
    assert_eq!(command.direction(), Direction::Up);
    assert_eq!(command.magnitude(), 1.5);
    assert_eq!(command.unit(), "m");
}

/// Test 3: Small talk is not a request
#[tokio::test]
async fn test_weather_is_not_a_request() {
    let extractor = extractor();
    let rejection = extractor.extract(WEATHER).await.unwrap_err();

    assert_eq!(rejection.reason, RejectionReason::NotARequest);
    assert!(!rejection.reason.is_transient());
}

/// Test 4: Rejected intents never reach the span extractor
#[tokio::test]
async fn test_not_a_request_short_circuits() {
    let extractor = extractor();
    let _ = extractor.extract(WEATHER).await;

    assert_eq!(extractor.models().classify_calls(), 1);
    assert_eq!(extractor.models().answer_calls(), 0);
}

/// Test 5: Unscripted texts score nothing and are never requests
#[tokio::test]
async fn test_unknown_text_short_circuits() {
    let extractor = extractor();
    for text in ["hello there", "", "what time is it?"] {
        let rejection = extractor.extract(text).await.unwrap_err();
        assert_eq!(rejection.reason, RejectionReason::NotARequest);
    }
    assert_eq!(extractor.models().answer_calls(), 0);
}

/// Test 6: Without an identifiable element there is no target
#[tokio::test]
async fn test_no_target_found() {
    let extractor = extractor();
    let rejection = extractor.extract(NO_TARGET).await.unwrap_err();

    assert_eq!(rejection.reason, RejectionReason::NoTargetFound);
    // Kind was unclear, so the generic question was asked
    assert_eq!(rejection.progress.element.as_deref(), Some("element"));
    assert!(rejection.progress.target.is_none());
}

/// Test 7: Without a quantity there is no magnitude, and no command
#[tokio::test]
async fn test_no_magnitude_found() {
    let extractor = extractor();
    let rejection = extractor.extract(NO_MAGNITUDE).await.unwrap_err();

    assert_eq!(rejection.reason, RejectionReason::NoMagnitudeFound);
    assert_eq!(rejection.progress.target.as_deref(), Some("B125"));
    assert_eq!(rejection.progress.direction, Some(Direction::Down));
    assert!(rejection.progress.magnitude.is_none());
}

/// Test 8: Extraction is idempotent for identical text and models
#[tokio::test]
async fn test_extraction_is_idempotent() {
    let extractor = extractor();
    let first = extractor.extract(LOWER_B125).await.unwrap();
    let second = extractor.extract(LOWER_B125).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.magnitude().to_bits(), second.magnitude().to_bits());
}

/// Test 9: A successful extraction uses exactly eight inference calls
#[tokio::test]
async fn test_full_pipeline_call_budget() {
    let extractor = extractor();
    extractor.extract(RAISE_B200).await.unwrap();

    // intent, element kinds, chosen kind alone, direction
    assert_eq!(extractor.models().classify_calls(), 4);
    assert_eq!(extractor.models().answer_calls(), 4);
}

/// Test 10: A stricter intent threshold turns borderline requests away
#[tokio::test]
async fn test_intent_threshold_is_configurable() {
    let config = ExtractorConfig {
        intent_threshold: 0.95,
        ..ExtractorConfig::default()
    };
    let extractor = CommandExtractor::new(config, sample_models()).unwrap();

    let rejection = extractor.extract(RAISE_B200).await.unwrap_err();
    assert_eq!(rejection.reason, RejectionReason::NotARequest);

    assert!(extractor.extract(LOWER_B125).await.is_ok());
}

proptest! {
    /// Test 11: Whatever the text, a request score below the threshold stops before any span extraction
    #[test]
    fn prop_not_a_request_never_extracts(text in "\\PC{0,60}", score in 0.0f32..0.6f32) {
        let models = ScriptedModels::new()
            .with_scores(&text, &[("request", score), ("beam", 0.9)])
            .with_answer("Which is the beam?", &text, &text);
        let extractor = CommandExtractor::new(ExtractorConfig::default(), models).unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let rejection = rt.block_on(extractor.extract(&text)).unwrap_err();

        prop_assert_eq!(rejection.reason, RejectionReason::NotARequest);
        prop_assert_eq!(extractor.models().classify_calls(), 1);
        prop_assert_eq!(extractor.models().answer_calls(), 0);
    }
}
