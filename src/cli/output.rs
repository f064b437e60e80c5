//! Output formatting for CLI commands.

use serde::Serialize;
use serde_json::Value;

use crate::cli::args::{OutputFormat, SentinelArgs};
use crate::error::Result;
use crate::resources::{AcquisitionAttempt, SearchPathReport};

/// Result structure for local prediction.
#[derive(Debug, Serialize)]
pub struct PredictionResult {
    pub input: String,
    pub prediction: String,
    pub confidence: f64,
    pub fake_probability: f64,
    pub cleaned: String,
}

/// Result structure for a review the normalizer refused.
#[derive(Debug, Serialize)]
pub struct RejectionResult {
    pub input: String,
    pub reason: &'static str,
    pub error: String,
}

/// Result structure for normalization.
#[derive(Debug, Serialize)]
pub struct NormalizationResult {
    pub input: String,
    pub cleaned: Option<String>,
    pub rejection: Option<String>,
    pub tokens: usize,
    pub tokenizer: String,
    pub lexicon_source: String,
    pub fingerprint: String,
}

/// Result structure for lexicon acquisition.
#[derive(Debug, Serialize)]
pub struct ResourcesResult {
    pub search_paths: Vec<SearchPathReport>,
    pub attempts: Vec<AcquisitionAttempt>,
    pub lexicon_source: Option<String>,
    pub lexicon_words: usize,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &SentinelArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &SentinelArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    let mut lines = Vec::new();
    render_value(&value, 0, &mut lines);
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SentinelArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.4}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Render nested objects as indented `key: value` lines.
fn render_value(value: &Value, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{indent}{key}:"));
                        render_value(child, depth + 1, lines);
                    }
                    _ => lines.push(format!("{indent}{key}: {}", scalar(child))),
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        lines.push(format!("{indent}[{i}]"));
                        render_value(item, depth + 1, lines);
                    }
                    _ => lines.push(format!("{indent}- {}", scalar(item))),
                }
            }
        }
        other => lines.push(format!("{indent}{}", scalar(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_value() {
        let value = json!({
            "prediction": "Fake Review",
            "confidence": 0.875,
            "cleaned": null,
            "paths": ["a", "b"],
        });
        let mut lines = Vec::new();
        render_value(&value, 0, &mut lines);

        assert!(lines.contains(&"prediction: Fake Review".to_string()));
        assert!(lines.contains(&"confidence: 0.8750".to_string()));
        assert!(lines.contains(&"cleaned: -".to_string()));
        assert!(lines.contains(&"paths:".to_string()));
        assert!(lines.contains(&"  - a".to_string()));
    }
}
