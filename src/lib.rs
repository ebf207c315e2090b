//! picturedb - Picture metadata indexer with PhotoPrism album sync
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod indexer;
pub mod photoprism;
pub mod sync;
