//! Utility functions.

pub mod parser;

pub use parser::{cookie_value, parse_duration};
