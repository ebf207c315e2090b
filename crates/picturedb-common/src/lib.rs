//! Picturedb-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across picturedb:
//!
//! - **Path Utilities**: the picture extension allow-list, root normalisation
//!   and the directory components stored alongside every indexed picture
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use picturedb_common::{Error, Result};
//! use picturedb_common::paths::is_picture_file;
//! use std::path::Path;
//!
//! // Check file types
//! assert!(is_picture_file(Path::new("IMG_0001.HEIC")));
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("tag prefix must not be empty"))
//! }
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
pub use paths::DirectoryComponents;
