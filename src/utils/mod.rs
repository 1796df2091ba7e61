//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Process invocation with consistent error handling

pub mod command;
