use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Env var consulted for the app password when the config names none.
pub const DEFAULT_PASSWORD_ENV_VAR: &str = "BILLSWEEP_APP_PASSWORD";

/// Scanner configuration, read from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Mailbox account, also used to detect group addresses on the same domain.
    pub email: String,

    /// IMAP server hostname.
    #[serde(default = "default_host")]
    pub host: String,

    /// IMAP server port (default: 993 for IMAPS).
    #[serde(default = "default_imap_port")]
    pub port: u16,

    /// Whether to use TLS (required).
    #[serde(default = "default_true")]
    pub use_tls: bool,

    #[serde(default)]
    pub auth: AuthSettings,

    /// Subject keywords, matched case-insensitively.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Messages fetched per round trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Upper bound for a single server operation, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Primary inbox, scanned after every other folder.
    #[serde(default = "default_inbox")]
    pub inbox: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// Environment variable containing the app password.
    #[serde(default = "default_password_env_var")]
    pub password_env_var: Option<String>,

    /// Path to a file containing the app password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,

    /// Direct password value.
    /// WARNING: storing passwords in config files is insecure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "passwordInsecure",
        alias = "password"
    )]
    pub password_insecure: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            password_env_var: default_password_env_var(),
            password_file: None,
            password_insecure: None,
        }
    }
}

fn default_host() -> String {
    "imap.gmail.com".to_string()
}

fn default_imap_port() -> u16 {
    993
}

fn default_true() -> bool {
    true
}

fn default_password_env_var() -> Option<String> {
    Some(DEFAULT_PASSWORD_ENV_VAR.to_string())
}

pub fn default_keywords() -> Vec<String> {
    [
        "invoice",
        "bill",
        "receipt",
        "payment",
        "transaction",
        "charge",
        "settlement",
        "remittance",
        "transfer",
        "refund",
        "statement",
        "account",
        "balance",
        "due",
        "overdue",
        "paid",
        "unpaid",
        "billing",
        "subscription",
        "renewal",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_batch_size() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

fn default_inbox() -> String {
    "INBOX".to_string()
}

impl Config {
    /// Config with defaults for everything except the account.
    pub fn for_account(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            host: default_host(),
            port: default_imap_port(),
            use_tls: true,
            auth: AuthSettings::default(),
            keywords: default_keywords(),
            batch_size: default_batch_size(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            inbox: default_inbox(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// `<platform config dir>/billsweep/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("billsweep").join("config.json"))
    }
}
