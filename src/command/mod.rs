//! Command extraction and execution pipeline
//!
//! Free text -> CommandExtractor -> MoveCommand -> ElementSink -> Ack

pub mod executor;
pub mod extractor;
pub mod quantity;
pub mod reply;

pub use executor::{Ack, ElementModel, ElementSink, ExecutionError};
pub use extractor::{CommandExtractor, Progress, Rejection, RejectionReason};
