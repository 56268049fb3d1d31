pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{default_keywords, AuthSettings, Config, DEFAULT_PASSWORD_ENV_VAR};
