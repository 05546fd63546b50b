//! Comparison configuration
//!
//! This crate provides the per-field configuration tree consulted during a
//! comparison and the loader for settings documents produced by script
//! compilers.
//!
//! # Example
//!
//! ```ignore
//! use mv_config::{load_settings_file, ConfigNode};
//!
//! let document = load_settings_file("verify.yaml")?;
//! let parties = document.meta.resolve_element("NoPartyIDs", 0);
//! ```

mod error;
mod loader;
mod meta;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_settings_file, load_settings_json, load_settings_yaml, SettingsDocument};
pub use meta::{ConfigNode, FailUnexpected};
