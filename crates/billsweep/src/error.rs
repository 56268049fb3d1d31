use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillsweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Date window error: {0}")]
    Window(#[from] WindowError),

    #[error("Mailbox error: {0}")]
    Email(#[from] crate::email::EmailError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("No config file found and no platform config directory available")]
    NoConfigDirectory,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Month cannot be empty")]
    EmptyMonth,

    #[error("Invalid month '{value}' (need YYYY-MM): {source}")]
    InvalidMonth {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Date window is empty: since {since} is not before {before}")]
    EmptyWindow { since: NaiveDate, before: NaiveDate },

    #[error("Month '{0}' is out of the supported date range")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, BillsweepError>;
