//! NLP capabilities: traits plus the HTTP and scripted backends

pub mod capability;
pub mod client;
pub mod scripted;

pub use capability::{Classification, LabelScore, QuestionAnswerer, Span, ZeroShotClassifier};
pub use client::InferenceClient;
pub use scripted::ScriptedModels;
