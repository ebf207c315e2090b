//! exiftool-based metadata extraction.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{get_tool_path, EXIFTOOL};
use crate::types::ExtractedMetadata;
use crate::{Error, MetadataExtractor, Result};

/// Tags requested from exiftool. Dates are printed as Unix seconds via `-d %s`.
const TAGS: [&str; 5] = [
    "-DateTimeOriginal",
    "-Make",
    "-Model",
    "-Rating",
    "-Keywords",
];

#[derive(Debug, Deserialize)]
struct ExiftoolEntry {
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "DateTimeOriginal")]
    date_time_original: Option<Value>,
    #[serde(rename = "Make")]
    make: Option<Value>,
    #[serde(rename = "Model")]
    model: Option<Value>,
    #[serde(rename = "Rating")]
    rating: Option<Value>,
    #[serde(rename = "Keywords")]
    keywords: Option<Value>,
}

/// Runs one `exiftool` process per picture.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    /// Use `exiftool` from PATH.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(EXIFTOOL),
        }
    }

    /// Use a specific exiftool executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate exiftool, preferring a configured path over PATH lookup.
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        get_tool_path(EXIFTOOL, configured).map(Self::with_program)
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor for ExifTool {
    fn name(&self) -> &'static str {
        EXIFTOOL
    }

    fn extract(&self, path: &Path) -> Result<ExtractedMetadata> {
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {:?} on {:?}", self.program, path);

        let output = Command::new(&self.program)
            .args(["-json", "-d", "%s"])
            .args(TAGS)
            .arg(file_argument(path))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(EXIFTOOL)
                } else {
                    Error::Io(e)
                }
            })?;

        // Non-zero exit still prints JSON with an "Error" field for files
        // exiftool can open but not parse.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(EXIFTOOL, stderr.trim().to_string()));
        }

        let json_str = String::from_utf8(output.stdout)
            .map_err(|e| Error::parse_error(EXIFTOOL, format!("Invalid UTF-8: {}", e)))?;

        parse_exiftool_output(path, &json_str)
    }
}

/// Keep a leading `-` in a file name from being read as an option.
fn file_argument(path: &Path) -> PathBuf {
    if path.to_string_lossy().starts_with('-') {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

fn parse_exiftool_output(path: &Path, json_str: &str) -> Result<ExtractedMetadata> {
    let entries: Vec<ExiftoolEntry> = serde_json::from_str(json_str)?;
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse_error(EXIFTOOL, "no entry in output"))?;

    if let Some(message) = entry.error {
        return Err(Error::extraction(path, message));
    }

    Ok(ExtractedMetadata {
        captured_at: entry
            .date_time_original
            .as_ref()
            .and_then(as_integer)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        make: entry.make.as_ref().and_then(as_text),
        model: entry.model.as_ref().and_then(as_text),
        rating: entry.rating.as_ref().and_then(as_integer),
        keywords: entry.keywords.as_ref().map(keyword_set).unwrap_or_default(),
    })
}

/// exiftool prints numeric-looking values as JSON numbers.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A single keyword comes back as a scalar, several as an array.
fn keyword_set(value: &Value) -> BTreeSet<String> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .filter_map(as_text)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
