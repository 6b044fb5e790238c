//! Staged extraction of a move command from free text
//!
//! Each stage is one or more inference calls with a typed result:
//!
//! intent -> discipline -> element kind -> target id -> action phrase -> direction -> magnitude
//!
//! Any stage may reject the instruction, which ends the pipeline. Nothing
//! is guessed: a command is only returned when every stage succeeded.

use crate::command::quantity::{parse_number, unit_after};
use crate::core::config::ExtractorConfig;
use crate::core::error::{self, AgentError};
use crate::core::types::{Direction, MoveCommand};
use crate::nlp::capability::{LabelScore, QuestionAnswerer, Span, ZeroShotClassifier};
use std::future::Future;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Why an instruction could not be turned into a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("text is not a request")]
    NotARequest,

    #[error("no discipline recognised")]
    NoDisciplineFound,

    #[error("discipline not supported: {0}")]
    UnsupportedDiscipline(String),

    #[error("no target element found")]
    NoTargetFound,

    #[error("no action found")]
    NoActionFound,

    #[error("no direction found")]
    NoDirectionFound,

    #[error("no magnitude found")]
    NoMagnitudeFound,

    #[error("magnitude is not a valid number")]
    MalformedNumber,

    #[error("inference unavailable: {0}")]
    InferenceUnavailable(String),
}

impl RejectionReason {
    /// Only backend failures are worth retrying unchanged
    pub fn is_transient(&self) -> bool {
        matches!(self, RejectionReason::InferenceUnavailable(_))
    }
}

/// What the pipeline had understood when it stopped
///
/// Only used to word replies; it is never turned into a command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub element: Option<String>,
    pub target: Option<String>,
    pub direction: Option<Direction>,
    pub magnitude: Option<(f64, String)>,
}

impl From<&MoveCommand> for Progress {
    fn from(command: &MoveCommand) -> Self {
        Self {
            element: Some(command.element().to_string()),
            target: Some(command.target_id().to_string()),
            direction: Some(command.direction()),
            magnitude: Some((command.magnitude(), command.unit().to_string())),
        }
    }
}

/// A rejected instruction
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct Rejection {
    pub reason: RejectionReason,
    pub progress: Progress,
}

/// Converts free-text instructions into move commands
pub struct CommandExtractor<M> {
    config: ExtractorConfig,
    direction_labels: Vec<String>,
    models: M,
}

impl<M> CommandExtractor<M>
where
    M: ZeroShotClassifier + QuestionAnswerer,
{
    /// Build an extractor; fails when `config` does not validate
    pub fn new(config: ExtractorConfig, models: M) -> error::Result<Self> {
        config.validate()?;
        let direction_labels = config.direction_labels();
        Ok(Self {
            config,
            direction_labels,
            models,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn models(&self) -> &M {
        &self.models
    }

    /// Extract a move command from `text`
    ///
    /// All-or-nothing: either every field was extracted or the
    /// instruction is rejected with the reason of the failing stage.
    pub async fn extract(&self, text: &str) -> Result<MoveCommand, Rejection> {
        let mut progress = Progress::default();

        match self.run_stages(text, &mut progress).await {
            Ok(command) => {
                info!(
                    target_id = command.target_id(),
                    direction = %command.direction(),
                    magnitude = command.magnitude(),
                    unit = command.unit(),
                    "Extracted move command"
                );
                Ok(command)
            }
            Err(reason) => {
                info!(%reason, "Instruction rejected");
                Err(Rejection { reason, progress })
            }
        }
    }

    async fn run_stages(
        &self,
        text: &str,
        progress: &mut Progress,
    ) -> Result<MoveCommand, RejectionReason> {
        let intent = self.classify_intent(text).await?;
        debug!(label = %intent.label, confidence = intent.confidence, "Intent accepted");

        self.discipline(text).await?;

        let element = self.element_kind(text).await?;
        progress.element = Some(element.clone());

        let target = self.target_id(text, &element).await?;
        progress.target = Some(target.clone());

        let action = self.action_phrase(text, &element, &target).await?;

        let direction = self.direction(&action).await?;
        progress.direction = Some(direction);

        let (magnitude, unit) = self.magnitude(&action).await?;

        Ok(MoveCommand::new(target, element, direction, magnitude, unit))
    }

    /// Stage 1: is this a request at all
    async fn classify_intent(&self, text: &str) -> Result<LabelScore, RejectionReason> {
        let classification = self
            .infer("intent", self.models.classify(text, &self.config.intent_labels))
            .await?;

        let label = self.config.request_label();
        let confidence = classification.score_of(label);
        if confidence < self.config.intent_threshold {
            debug!(confidence, threshold = self.config.intent_threshold, "Below intent threshold");
            return Err(RejectionReason::NotARequest);
        }

        Ok(LabelScore {
            label: label.to_string(),
            confidence,
        })
    }

    /// Stage 2: route by discipline; only supported ones go on
    ///
    /// Names and aliases are scored one at a time, in configured order.
    async fn discipline(&self, text: &str) -> Result<Option<String>, RejectionReason> {
        if self.config.disciplines.is_empty() {
            return Ok(None);
        }

        for discipline in &self.config.disciplines {
            for label in discipline.labels() {
                let score = self.entailment("discipline", text, label).await?;
                if score < self.config.discipline_threshold {
                    continue;
                }
                if !discipline.supported {
                    debug!(discipline = %discipline.name, label, score, "Discipline not supported");
                    return Err(RejectionReason::UnsupportedDiscipline(
                        discipline.name.clone(),
                    ));
                }
                debug!(discipline = %discipline.name, label, score, "Discipline recognised");
                return Ok(Some(discipline.name.clone()));
            }
        }

        Err(RejectionReason::NoDisciplineFound)
    }

    /// Stage 3: which kind of element is talked about; falls back to the generic word
    ///
    /// The best of the competing kinds must also hold up on its own.
    async fn element_kind(&self, text: &str) -> Result<String, RejectionReason> {
        if self.config.element_kinds.is_empty() {
            return Ok(self.config.generic_element.clone());
        }

        let classification = self
            .infer("element", self.models.classify(text, &self.config.element_kinds))
            .await?;

        let Some(best) = classification.best() else {
            return Ok(self.config.generic_element.clone());
        };

        let score = self.entailment("element", text, &best.label).await?;
        if score < self.config.element_threshold {
            debug!(element = %best.label, score, "Element kind unclear, using generic question");
            return Ok(self.config.generic_element.clone());
        }

        debug!(element = %best.label, score, "Element kind recognised");
        Ok(best.label)
    }

    /// Stage 4: the element identifier, e.g. "B125"
    async fn target_id(&self, text: &str, element: &str) -> Result<String, RejectionReason> {
        let question = self.config.target_question(element);
        let span = self
            .infer("target", self.models.answer(&question, text))
            .await?;

        if !self.is_answer(&span) {
            return Err(RejectionReason::NoTargetFound);
        }

        let token = span
            .text
            .split_whitespace()
            .next()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .unwrap_or_default();

        if !is_element_id(token) {
            debug!(answer = %span.text, "Answer is not an element id");
            return Err(RejectionReason::NoTargetFound);
        }

        debug!(target_id = token, "Target found");
        Ok(token.to_string())
    }

    /// Stage 5: what should happen to the element, e.g. "lower by 0.2 m"
    async fn action_phrase(
        &self,
        text: &str,
        element: &str,
        target: &str,
    ) -> Result<String, RejectionReason> {
        let question = self.config.action_question(element, target);
        let span = self
            .infer("action", self.models.answer(&question, text))
            .await?;

        if !self.is_answer(&span) {
            return Err(RejectionReason::NoActionFound);
        }

        let action = span.text.trim().to_string();
        debug!(action = %action, "Action found");
        Ok(action)
    }

    /// Stage 6: direction label, mapped through the configured effect table
    async fn direction(&self, action: &str) -> Result<Direction, RejectionReason> {
        let classification = self
            .infer("direction", self.models.classify(action, &self.direction_labels))
            .await?;

        let best = classification
            .best()
            .filter(|best| best.confidence >= self.config.direction_threshold)
            .ok_or(RejectionReason::NoDirectionFound)?;

        let effect = self
            .config
            .directions
            .get(&best.label)
            .copied()
            .ok_or(RejectionReason::NoDirectionFound)?;

        let direction = Direction::from(effect);
        debug!(label = %best.label, %effect, %direction, "Direction found");
        Ok(direction)
    }

    /// Stage 7: quantity span first, then the bare number inside it
    async fn magnitude(&self, action: &str) -> Result<(f64, String), RejectionReason> {
        let quantity = self
            .infer("amount", self.models.answer(&self.config.amount_question, action))
            .await?;
        if !self.is_answer(&quantity) {
            return Err(RejectionReason::NoMagnitudeFound);
        }

        let number = self
            .infer(
                "number",
                self.models.answer(&self.config.number_question, &quantity.text),
            )
            .await?;
        if !self.is_answer(&number) {
            return Err(RejectionReason::NoMagnitudeFound);
        }

        let magnitude = parse_number(&number.text).ok_or(RejectionReason::MalformedNumber)?;
        if magnitude <= 0.0 {
            debug!(magnitude, "Magnitude must be positive");
            return Err(RejectionReason::MalformedNumber);
        }

        let unit = unit_after(&quantity.text, &number)
            .unwrap_or_else(|| self.config.default_unit.clone());

        debug!(quantity = %quantity.text, magnitude, unit = %unit, "Magnitude found");
        Ok((magnitude, unit))
    }

    /// Score of `label` as the only candidate for `text`
    async fn entailment(
        &self,
        stage: &'static str,
        text: &str,
        label: &str,
    ) -> Result<f32, RejectionReason> {
        let candidates = [label.to_string()];
        let classification = self
            .infer(stage, self.models.classify(text, &candidates))
            .await?;
        Ok(classification.score_of(label))
    }

    fn is_answer(&self, span: &Span) -> bool {
        !span.is_empty() && span.score >= self.config.min_span_score
    }

    /// Run one inference call under the configured timeout
    async fn infer<T>(
        &self,
        stage: &'static str,
        call: impl Future<Output = error::Result<T>>,
    ) -> Result<T, RejectionReason> {
        let limit = self.config.inference_timeout();
        match timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(stage, error = %err, "Inference call failed");
                Err(RejectionReason::InferenceUnavailable(err.to_string()))
            }
            Err(_) => {
                let err = AgentError::Timeout(limit);
                warn!(stage, error = %err, "Inference call timed out");
                Err(RejectionReason::InferenceUnavailable(err.to_string()))
            }
        }
    }
}

/// Element ids are single alphanumeric tags with at least one digit ("B125", "W15")
fn is_element_id(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(char::is_alphanumeric)
        && token.chars().any(|c| c.is_ascii_digit())
}
