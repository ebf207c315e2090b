//! Database query modules.
//!
//! This module organizes all database operations into logical groups:
//! - pictures: picture rows, tags, prefix listing for the purge pass
//! - grouping: album membership queries
//! - raw: SQL passthrough for diagnostics

pub mod grouping;
pub mod pictures;
pub mod raw;
