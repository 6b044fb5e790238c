//! Abstract NLP capabilities the extractor depends on
//!
//! Two capabilities cover everything the pipeline needs:
//! zero-shot classification (used for intent, element kind and direction)
//! and extractive question answering (used for every span).

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Scores of a zero-shot classification, one per candidate label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

/// A single label with its confidence (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub confidence: f32,
}

impl Classification {
    pub fn new(labels: Vec<String>, scores: Vec<f32>) -> Self {
        Self { labels, scores }
    }

    /// Score reported for `label`, 0.0 when the label was not scored
    pub fn score_of(&self, label: &str) -> f32 {
        self.iter()
            .find(|(l, _)| *l == label)
            .map(|(_, score)| score)
            .unwrap_or(0.0)
    }

    /// Highest scoring label; the earliest label wins a tie
    pub fn best(&self) -> Option<LabelScore> {
        let mut best: Option<(&str, f32)> = None;
        for (label, score) in self.iter() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((label, score));
            }
        }
        best.map(|(label, confidence)| LabelScore {
            label: label.to_string(),
            confidence,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }
}

/// An answer span extracted from a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// The "no answer" result
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            score: 0.0,
            start: 0,
            end: 0,
        }
    }

    /// Locate `answer` inside `context` and build a span for it
    ///
    /// Returns an empty span when the answer does not occur in the context.
    pub fn locate(context: &str, answer: &str, score: f32) -> Self {
        match context.find(answer) {
            Some(start) if !answer.is_empty() => Self {
                text: answer.to_string(),
                score,
                start,
                end: start + answer.len(),
            },
            _ => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Text of `context` following this span
    ///
    /// Uses the reported offsets when they really delimit the answer in
    /// `context`, otherwise the first occurrence of the answer.
    pub fn rest_of<'a>(&self, context: &'a str) -> Option<&'a str> {
        let answer = self.text.trim();
        if answer.is_empty() {
            return None;
        }

        match context.get(self.start..self.end) {
            Some(found) if found.trim() == answer => context.get(self.end..),
            _ => context
                .find(answer)
                .and_then(|start| context.get(start + answer.len()..)),
        }
    }
}

/// Zero-shot classification over arbitrary candidate labels
pub trait ZeroShotClassifier {
    /// Score `text` against every candidate; scores are normalised over the candidates
    fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> impl Future<Output = Result<Classification>> + Send;
}

/// Extractive question answering over a context string
pub trait QuestionAnswerer {
    /// Answer `question` with a substring of `context`, or an empty span
    fn answer(&self, question: &str, context: &str) -> impl Future<Output = Result<Span>> + Send;
}
