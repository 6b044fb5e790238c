//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cartesian axis of the structural model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index of this axis in an `[x, y, z]` position
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Direction an element is asked to move in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Front,
    Back,
}

impl Direction {
    /// Fixed axis table: up/down move along Z, left/right along X, front/back along Y
    pub fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Z,
            Direction::Left | Direction::Right => Axis::X,
            Direction::Front | Direction::Back => Axis::Y,
        }
    }

    /// +1.0 for up/right/front, -1.0 for down/left/back
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up | Direction::Right | Direction::Front => 1.0,
            Direction::Down | Direction::Left | Direction::Back => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Front => "front",
            Direction::Back => "back",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Effect> for Direction {
    fn from(effect: Effect) -> Self {
        match (effect.axis, effect.positive) {
            (Axis::Z, true) => Direction::Up,
            (Axis::Z, false) => Direction::Down,
            (Axis::X, true) => Direction::Right,
            (Axis::X, false) => Direction::Left,
            (Axis::Y, true) => Direction::Front,
            (Axis::Y, false) => Direction::Back,
        }
    }
}

/// Signed axis a direction label maps to, written `Z+`, `X-`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Effect {
    pub axis: Axis,
    pub positive: bool,
}

impl Effect {
    pub fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.axis, if self.positive { '+' } else { '-' })
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let (Some(axis), Some(sign), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(format!("Invalid effect '{}', expected e.g. \"Z+\"", s));
        };

        let axis = match axis.to_ascii_uppercase() {
            'X' => Axis::X,
            'Y' => Axis::Y,
            'Z' => Axis::Z,
            other => return Err(format!("Unknown axis '{}' in effect '{}'", other, s)),
        };
        let positive = match sign {
            '+' => true,
            '-' => false,
            other => return Err(format!("Unknown sign '{}' in effect '{}'", other, s)),
        };

        Ok(Self { axis, positive })
    }
}

impl TryFrom<String> for Effect {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        effect.to_string()
    }
}

/// A structured, actionable "move element" command
///
/// Built fresh for each instruction and never mutated afterwards,
/// which is why the fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCommand {
    target_id: String,
    element: String,
    axis: Axis,
    direction: Direction,
    magnitude: f64,
    unit: String,
}

impl MoveCommand {
    /// Build a command; the axis always follows from the direction
    pub fn new(
        target_id: impl Into<String>,
        element: impl Into<String>,
        direction: Direction,
        magnitude: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            element: element.into(),
            axis: direction.axis(),
            direction,
            magnitude,
            unit: unit.into(),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Element kind the target was asked about ("beam", "wall", or the generic "element")
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}
