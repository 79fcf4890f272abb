//! Inline `key:value` generation parameters.
//!
//! [`parse_generate_args`] scans the argument string of a `generate` command into a fully
//! populated [`GenerationConfig`] plus the literal text that follows the parameters.

mod config;
mod parser;

pub use config::{CenterMode, DEFAULT_DPI, DEFAULT_FONT_SIZE, Dimension, GenerationConfig, Mode};
pub use parser::{PARAM_KEYS, ParsedArgs, parse_generate_args};
