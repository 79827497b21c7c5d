//! Core library for the PrintHub print-server dashboard.
//! This crate defines the core traits (interfaces) and data structures,
//! the adapters over the privileged script, CUPS and system metrics,
//! and the axum web server that composes them.

pub mod auth;
pub mod backends;
pub mod config;
pub mod factory;
pub mod frontends;
pub mod metrics;
pub mod pages;
pub mod printers;
pub mod structs;
pub mod system;
pub mod traits;
pub mod web_server;
pub mod wifi;

// Define a shared Error and Result type for the entire crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Command timed out: {0}")]
    Timeout(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Web server error: {0}")]
    WebServer(#[from] axum::BoxError),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;
