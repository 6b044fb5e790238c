//! Extractor configuration with documented thresholds
//!
//! Vocabularies, thresholds and question templates all live here so they
//! can be tuned from `data/extractor.toml` instead of being baked into the
//! pipeline.

use crate::core::error::{AgentError, Result};
use crate::core::types::{Axis, Effect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default location of the extractor configuration file
pub const DEFAULT_CONFIG_PATH: &str = "data/extractor.toml";

/// Configuration for the command extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    // === INTENT ===
    /// Candidate intents the instruction is classified against
    ///
    /// The first label is the actionable one; its score is compared
    /// against `intent_threshold`. Extra labels only compete for mass.
    pub intent_labels: Vec<String>,

    /// Minimum score of the actionable intent (0.0 - 1.0)
    ///
    /// With a single candidate the classifier reports an entailment
    /// probability, so 0.6 means "more likely a request than not, with margin".
    pub intent_threshold: f32,

    // === DISCIPLINES ===
    /// Disciplines a request is routed by, tried in order
    ///
    /// Each name and alias is checked on its own against
    /// `discipline_threshold`; the first hit decides. Empty skips the check.
    pub disciplines: Vec<Discipline>,

    /// Minimum entailment score for a discipline name or alias
    pub discipline_threshold: f32,

    // === ELEMENT KIND ===
    /// Structural element kinds the target may be
    pub element_kinds: Vec<String>,

    /// Minimum entailment score for the best element kind to be used in questions
    ///
    /// The best kind among `element_kinds` is re-scored as the only
    /// candidate and compared against this. Below it the generic word is
    /// used instead. This stage never rejects.
    pub element_threshold: f32,

    /// Word used in questions when no element kind is recognised
    pub generic_element: String,

    // === DIRECTION ===
    /// Direction vocabulary: label -> effect (`"Z+"`, `"X-"`, ...)
    ///
    /// Several labels may share an effect ("raise" and "up").
    pub directions: BTreeMap<String, Effect>,

    /// Minimum score for the winning direction label
    ///
    /// Scores are normalised over all labels, so with six labels a uniform
    /// guess is ~0.17. 0.25 demands a visible preference.
    pub direction_threshold: f32,

    // === SPANS ===
    /// Answers scoring below this are treated as "no answer"
    pub min_span_score: f32,

    /// Unit assumed when the quantity carries none
    pub default_unit: String,

    /// Question used to find the target id; `{element}` is substituted
    pub target_question: String,

    /// Question used to find the action phrase; `{element}` and `{target}` are substituted
    pub action_question: String,

    /// Question posed against the action phrase to isolate the quantity
    pub amount_question: String,

    /// Question posed against the quantity to isolate the bare number
    pub number_question: String,

    // === RUNTIME ===
    /// Upper bound for a single inference call, in milliseconds
    pub inference_timeout_ms: u64,

    /// Elements the interactive model starts with
    pub elements: Vec<ElementSeed>,
}

/// An engineering discipline requests may belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discipline {
    pub name: String,
    /// Other words for the discipline ("mechanical" for MEP)
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Whether move commands are extracted for it; other disciplines are refused
    #[serde(default)]
    pub supported: bool,
}

impl Discipline {
    pub fn new(name: impl Into<String>, supported: bool) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            supported,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Name first, then aliases
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// An element preloaded into the in-memory model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSeed {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub position: [f64; 3],
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let directions = [
            ("up", Axis::Z, true),
            ("down", Axis::Z, false),
            ("left", Axis::X, false),
            ("right", Axis::X, true),
            ("front", Axis::Y, true),
            ("back", Axis::Y, false),
        ]
        .into_iter()
        .map(|(label, axis, positive)| (label.to_string(), Effect::new(axis, positive)))
        .collect();

        Self {
            intent_labels: vec!["request".into()],
            intent_threshold: 0.6,

            disciplines: Vec::new(),
            discipline_threshold: 0.6,

            element_kinds: vec!["wall".into(), "slab".into(), "beam".into(), "column".into()],
            element_threshold: 0.6,
            generic_element: "element".into(),

            directions,
            direction_threshold: 0.25,

            min_span_score: 0.01,
            default_unit: "m".into(),
            target_question: "Which is the {element}?".into(),
            action_question: "What should we do with the {element} {target}?".into(),
            amount_question: "By how much?".into(),
            number_question: "number".into(),

            inference_timeout_ms: 10_000,
            elements: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AgentError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check vocabularies, thresholds and timeout for usable values
    pub fn validate(&self) -> Result<()> {
        if self.intent_labels.is_empty() {
            return Err(AgentError::Config("intent_labels must not be empty".into()));
        }
        if self.directions.is_empty() {
            return Err(AgentError::Config("directions must not be empty".into()));
        }
        if self.generic_element.trim().is_empty() {
            return Err(AgentError::Config("generic_element must not be empty".into()));
        }
        if self
            .disciplines
            .iter()
            .flat_map(Discipline::labels)
            .any(|label| label.trim().is_empty())
        {
            return Err(AgentError::Config(
                "discipline names and aliases must not be empty".into(),
            ));
        }

        let thresholds = [
            ("intent_threshold", self.intent_threshold),
            ("discipline_threshold", self.discipline_threshold),
            ("element_threshold", self.element_threshold),
            ("direction_threshold", self.direction_threshold),
            ("min_span_score", self.min_span_score),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(AgentError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.inference_timeout_ms == 0 {
            return Err(AgentError::Config(
                "inference_timeout_ms must be positive".into(),
            ));
        }

        Ok(())
    }

    /// The actionable intent label
    pub fn request_label(&self) -> &str {
        self.intent_labels.first().map(String::as_str).unwrap_or("request")
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    /// Direction labels in a stable order
    pub fn direction_labels(&self) -> Vec<String> {
        self.directions.keys().cloned().collect()
    }

    pub fn target_question(&self, element: &str) -> String {
        self.target_question.replace("{element}", element)
    }

    pub fn action_question(&self, element: &str, target: &str) -> String {
        self.action_question
            .replace("{element}", element)
            .replace("{target}", target)
    }
}
