//! Database access shared across the Packrat service
//!
//! - `init`: connection pool setup and table creation
//! - `models`: persisted records and enriched view models

pub mod init;
pub mod models;

pub use init::init_database;
