//! Command execution - applies move commands to structural elements

use crate::core::config::ElementSeed;
use crate::core::types::MoveCommand;
use ahash::AHashMap;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Anything that can carry out a move command
pub trait ElementSink {
    fn move_element(&mut self, command: &MoveCommand) -> Result<Ack, ExecutionError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Unsupported unit: {0}")]
    UnsupportedUnit(String),

    #[error("Element {id} is a {found}, not a {expected}")]
    KindMismatch {
        id: String,
        expected: String,
        found: String,
    },
}

/// Receipt for an executed command
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub receipt: Uuid,
    pub target_id: String,
    /// Signed offset applied, in metres
    pub offset: f64,
    /// Position after the move, in metres
    pub position: [f64; 3],
}

/// A structural element of the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: String,
    pub kind: String,
    pub position: [f64; 3],
}

/// In-memory structural model keyed by element id
///
/// Ids are matched case-insensitively ("b125" finds "B125").
#[derive(Debug)]
pub struct ElementModel {
    elements: AHashMap<String, Element>,
    generic_kind: String,
}

impl ElementModel {
    pub fn new() -> Self {
        Self {
            elements: AHashMap::new(),
            generic_kind: "element".into(),
        }
    }

    pub fn from_seeds(seeds: &[ElementSeed]) -> Self {
        let mut model = Self::new();
        for seed in seeds {
            model.insert(&seed.id, &seed.kind, seed.position);
        }
        model
    }

    /// Kind word that matches any element ("element" by default)
    pub fn with_generic_kind(mut self, kind: impl Into<String>) -> Self {
        self.generic_kind = kind.into();
        self
    }

    pub fn insert(&mut self, id: &str, kind: &str, position: [f64; 3]) {
        self.elements.insert(
            key(id),
            Element {
                id: id.to_string(),
                kind: kind.to_string(),
                position,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(&key(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements sorted by id
    pub fn elements(&self) -> Vec<&Element> {
        let mut elements: Vec<_> = self.elements.values().collect();
        elements.sort_by(|a, b| a.id.cmp(&b.id));
        elements
    }
}

impl Default for ElementModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementSink for ElementModel {
    fn move_element(&mut self, command: &MoveCommand) -> Result<Ack, ExecutionError> {
        let factor = metres_per_unit(command.unit())
            .ok_or_else(|| ExecutionError::UnsupportedUnit(command.unit().to_string()))?;

        let any_kind = command.element().eq_ignore_ascii_case(&self.generic_kind);
        let element = self
            .elements
            .get_mut(&key(command.target_id()))
            .ok_or_else(|| ExecutionError::UnknownElement(command.target_id().to_string()))?;

        if !any_kind && !command.element().eq_ignore_ascii_case(&element.kind) {
            return Err(ExecutionError::KindMismatch {
                id: element.id.clone(),
                expected: command.element().to_string(),
                found: element.kind.clone(),
            });
        }

        let offset = command.direction().sign() * command.magnitude() * factor;
        element.position[command.axis().index()] += offset;

        info!(
            id = %element.id,
            axis = %command.axis(),
            offset,
            "Element moved"
        );

        Ok(Ack {
            receipt: Uuid::new_v4(),
            target_id: element.id.clone(),
            offset,
            position: element.position,
        })
    }
}

fn key(id: &str) -> String {
    id.to_ascii_uppercase()
}

/// Conversion factor from `unit` to metres
pub fn metres_per_unit(unit: &str) -> Option<f64> {
    match unit.to_ascii_lowercase().as_str() {
        "m" | "meter" | "meters" | "metre" | "metres" => Some(1.0),
        "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => Some(0.01),
        "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => Some(0.001),
        "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Some(1000.0),
        _ => None,
    }
}
