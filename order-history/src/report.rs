//! Labeled result blocks printed by the driver

use serde_json::Value;

const RULE: &str = "=====================";

fn banner(label: &str, outcome: &str) -> String {
    format!("{RULE} {label} {outcome} {RULE}")
}

/// Success header followed by the pretty-printed result
///
/// # Errors
///
/// Returns an error if `output` cannot be rendered as JSON
pub fn success_block(label: &str, output: &Value) -> serde_json::Result<String> {
    Ok(format!(
        "{}\n{}",
        banner(label, "success"),
        serde_json::to_string_pretty(output)?
    ))
}

/// Error header followed by the error and its causes
#[must_use]
pub fn error_block(label: &str, error: &anyhow::Error) -> String {
    format!("{}\n{error:#}", banner(label, "error"))
}
