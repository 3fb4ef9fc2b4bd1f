//! Output generation module
//!
//! - JSON verdict (stdout with `--json`, and the `--output` file)
//! - Console (human-readable)

mod console;

pub use console::print_verdict;

use city_kit::execution_api::Verdict;

/// Render the verdict as pretty-printed JSON
pub fn build_output(verdict: &Verdict) -> Result<String, OutputError> {
    serde_json::to_string_pretty(verdict).map_err(|e| OutputError::Serialization(e.to_string()))
}

/// Errors that can occur during output generation
#[derive(Debug)]
pub enum OutputError {
    /// JSON serialization failed
    Serialization(String),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for OutputError {}
