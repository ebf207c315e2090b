//! # picturedb-exif
//!
//! Picture metadata extraction for picturedb.
//!
//! Extraction sits behind the [`MetadataExtractor`] trait so the indexer can
//! be driven by a fake in tests. [`ExifTool`] is the production extractor
//! and runs one `exiftool` process per file.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use picturedb_exif::{ExifTool, MetadataExtractor};
//! use std::path::Path;
//!
//! let exiftool = ExifTool::discover(None)?;
//! let meta = exiftool.extract(Path::new("holiday/IMG_0001.jpg"))?;
//! println!("Rating: {:?}", meta.rating);
//! # Ok::<(), picturedb_exif::Error>(())
//! ```

mod error;
pub mod exiftool;
pub mod tools;
mod types;

use std::path::Path;

// Re-exports
pub use error::{Error, Result};
pub use exiftool::ExifTool;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
pub use types::ExtractedMetadata;

/// Reads indexed metadata fields from a picture file.
pub trait MetadataExtractor: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Extract metadata from a single file.
    fn extract(&self, path: &Path) -> Result<ExtractedMetadata>;
}
