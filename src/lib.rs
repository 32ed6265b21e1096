//! Cabinstay reservation backend.
//!
//! SQLite-backed repositories, configuration and the HTTP server built on
//! the guest identity and availability logic in `cabinstay-core`.

pub mod config;
pub mod db;
pub mod server;
