//! Metadata extracted from a picture file.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata read from a single picture.
///
/// Every field is optional: a field the file does not carry stays `None`,
/// which is different from a field that is present but empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// When the picture was taken (`DateTimeOriginal`).
    pub captured_at: Option<DateTime<Utc>>,
    /// Camera manufacturer.
    pub make: Option<String>,
    /// Camera model.
    pub model: Option<String>,
    /// Star rating.
    pub rating: Option<i64>,
    /// Keywords, deduplicated.
    pub keywords: BTreeSet<String>,
}

impl ExtractedMetadata {
    /// True when the file carried none of the indexed fields.
    pub fn is_empty(&self) -> bool {
        self.captured_at.is_none()
            && self.make.is_none()
            && self.model.is_none()
            && self.rating.is_none()
            && self.keywords.is_empty()
    }
}
