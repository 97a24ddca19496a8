//! Infrastructure layer for Agora.
//!
//! Contains the SQLite implementation of the `MessageStore` trait defined in
//! `agora-core`, the `config.toml` loader, and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod sqlite;
