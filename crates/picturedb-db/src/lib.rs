//! Picturedb-DB: Database schema, migrations, and query operations
//!
//! This crate provides the local picture index using SQLite with rusqlite
//! and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use picturedb_db::pool::{init_pool, get_conn};
//! use picturedb_db::queries::pictures;
//!
//! let pool = init_pool("picturedb.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! println!("{} pictures indexed", pictures::count_pictures(&conn).unwrap());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
