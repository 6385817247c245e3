//! Rendering module for writing outlines in various output formats.

mod json;
mod text;

pub use json::{from_json, is_valid_outline_json, to_json, validate_outline_json, JsonFormat};
pub use text::to_text;
