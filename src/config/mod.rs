//! Config module.
//! Provides configuration types, the config file location, XML loading and validation.
//!
//! Precedence: built-in defaults < XML config file < CLI flags.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor, resolve_config_path, ConfigLocation};
pub use types::{Config, LogLevel};
pub use validate::validate_and_normalize;
pub use xml::{load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BUCKET_COPY_CONFIG";
