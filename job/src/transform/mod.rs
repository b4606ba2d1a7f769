//! Transformation module.
//!
//! Turns the nested categories tree into flat topic/subtopic records:
//! - Flatten: tree walk, keyword validation, style modifier defaults

pub mod flatten;

pub use flatten::*;
