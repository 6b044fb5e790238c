//! Deterministic in-process models driven by lookup tables
//!
//! Used wherever real inference is unwanted: unit and integration tests,
//! and dry runs. Every call is counted so callers can verify how much of
//! the pipeline actually ran.

use crate::core::error::{AgentError, Result};
use crate::nlp::capability::{Classification, QuestionAnswerer, Span, ZeroShotClassifier};
use ahash::AHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Score given to scripted answers
const SCRIPTED_ANSWER_SCORE: f32 = 0.9;

/// Table-driven stand-in for the zero-shot and question answering models
///
/// Unscripted texts score 0.0 on every label and unscripted questions
/// get an empty answer, i.e. the model "knows nothing".
///
/// A real zero-shot model scores a label differently when it is the only
/// candidate (entailment) than when it competes with others (normalised
/// share). `with_entailment` scripts the former; without it both use the
/// `with_scores` value.
#[derive(Debug, Default)]
pub struct ScriptedModels {
    scores: AHashMap<String, AHashMap<String, f32>>,
    entailment: AHashMap<(String, String), f32>,
    answers: AHashMap<(String, String), Span>,
    latency: Option<Duration>,
    unavailable: bool,
    classify_calls: AtomicUsize,
    answer_calls: AtomicUsize,
}

impl ScriptedModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the scores `text` receives for the given labels
    pub fn with_scores(mut self, text: &str, scores: &[(&str, f32)]) -> Self {
        let entry = self.scores.entry(text.to_string()).or_default();
        for (label, score) in scores {
            entry.insert(label.to_string(), *score);
        }
        self
    }

    /// Script the score `label` receives when it is the only candidate for `text`
    pub fn with_entailment(mut self, text: &str, label: &str, score: f32) -> Self {
        self.entailment
            .insert((text.to_string(), label.to_string()), score);
        self
    }

    /// Script the answer to `question` asked against `context`
    ///
    /// The answer must occur in the context, as with a real extractive model.
    /// Its offsets point at the first occurrence.
    pub fn with_answer(self, question: &str, context: &str, answer: &str) -> Self {
        let span = Span::locate(context, answer, SCRIPTED_ANSWER_SCORE);
        self.with_span(question, context, span)
    }

    /// Script the exact span returned for `question` asked against `context`
    pub fn with_span(mut self, question: &str, context: &str, span: Span) -> Self {
        self.answers
            .insert((question.to_string(), context.to_string()), span);
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every call fail as if the backend were down
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::Relaxed)
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::Relaxed)
    }

    pub fn total_calls(&self) -> usize {
        self.classify_calls() + self.answer_calls()
    }

    async fn simulate_backend(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable {
            return Err(AgentError::Inference("scripted backend unavailable".into()));
        }
        Ok(())
    }
}

impl ZeroShotClassifier for ScriptedModels {
    async fn classify(&self, text: &str, candidate_labels: &[String]) -> Result<Classification> {
        self.classify_calls.fetch_add(1, Ordering::Relaxed);
        self.simulate_backend().await?;

        if let [label] = candidate_labels {
            if let Some(score) = self.entailment.get(&(text.to_string(), label.clone())) {
                return Ok(Classification::new(vec![label.clone()], vec![*score]));
            }
        }

        let scripted = self.scores.get(text);
        let scores = candidate_labels
            .iter()
            .map(|label| {
                scripted
                    .and_then(|s| s.get(label))
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Classification::new(candidate_labels.to_vec(), scores))
    }
}

impl QuestionAnswerer for ScriptedModels {
    async fn answer(&self, question: &str, context: &str) -> Result<Span> {
        self.answer_calls.fetch_add(1, Ordering::Relaxed);
        self.simulate_backend().await?;

        Ok(self
            .answers
            .get(&(question.to_string(), context.to_string()))
            .cloned()
            .unwrap_or_else(Span::empty))
    }
}
