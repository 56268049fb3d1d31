pub mod classify;
pub mod config;
pub mod email;
pub mod error;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod window;

pub use classify::{AttachmentClassifier, SignalEvaluator};
pub use config::{load_config, load_config_from_str, Config};
pub use email::{ImapClient, MailScanner, MailboxProvider, ScanReport, ScanSettings};
pub use error::{BillsweepError, ConfigError, Result, StorageError, WindowError};
pub use secrets::{resolve_password, resolve_secret, SecretError};
pub use storage::{AttachmentStore, DedupTable, StoreOutcome};
pub use window::DateWindow;
