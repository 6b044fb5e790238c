pub mod config;
pub mod error;
pub mod types;

pub use config::ExtractorConfig;
pub use types::{Axis, Direction, Effect, MoveCommand};
