//! NLP Agent - natural language change requests turned into element move commands

pub mod command;
pub mod core;
pub mod nlp;
