//! Settings document loading
//!
//! Script compilers hand over comparison settings as a YAML or JSON
//! document:
//!
//! ```yaml
//! check_groups_order: false
//! unchecked_fields: [SendingTime]
//! meta:
//!   double_precision: { Price: "0.01" }
//!   key_fields: { ClOrdID: true }
//!   fail_unexpected: Y
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::meta::ConfigNode;

/// Flat comparison settings plus the configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    /// Root of the per-field configuration tree
    pub meta: ConfigNode,

    /// Fields compared for display only; their statuses are forced to NA
    pub unchecked_fields: Vec<String>,

    /// Fields skipped entirely
    pub ignored_fields: Vec<String>,

    /// Compare repeating groups by position
    pub check_groups_order: bool,

    /// Compare simple value lists by position
    pub check_simple_collections_order: bool,

    /// Report unordered group results at their actual-side position
    pub keep_result_group_order: bool,

    /// Deprecated: field names whose PASSED/FAILED statuses are inverted
    pub negative_map: IndexMap<String, bool>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            meta: ConfigNode::default(),
            unchecked_fields: Vec::new(),
            ignored_fields: Vec::new(),
            check_groups_order: false,
            check_simple_collections_order: true,
            keep_result_group_order: false,
            negative_map: IndexMap::new(),
        }
    }
}

/// Parse a settings document from YAML
pub fn load_settings_yaml(content: &str) -> ConfigResult<SettingsDocument> {
    parse_yaml(content, Path::new("<inline>"))
}

/// Parse a settings document from JSON
pub fn load_settings_json(content: &str) -> ConfigResult<SettingsDocument> {
    parse_json(content, Path::new("<inline>"))
}

/// Load a settings document, picking the format from the file extension
pub fn load_settings_file(path: impl AsRef<Path>) -> ConfigResult<SettingsDocument> {
    let path = path.as_ref();
    debug!("Loading comparison settings: {:?}", path);

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let parse: fn(&str, &Path) -> ConfigResult<SettingsDocument> = match extension.as_deref() {
        Some("yaml") | Some("yml") => parse_yaml,
        Some("json") => parse_json,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, path)
}

fn parse_yaml(content: &str, path: &Path) -> ConfigResult<SettingsDocument> {
    let document: SettingsDocument =
        serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: PathBuf::from(path),
            source: e,
        })?;
    document.meta.validate()?;
    Ok(document)
}

fn parse_json(content: &str, path: &Path) -> ConfigResult<SettingsDocument> {
    let document: SettingsDocument =
        serde_json::from_str(content).map_err(|e| ConfigError::ParseJson {
            path: PathBuf::from(path),
            source: e,
        })?;
    document.meta.validate()?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FailUnexpected;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const YAML: &str = r#"
check_groups_order: true
unchecked_fields: [SendingTime]
negative_map: { OrdStatus: true }
meta:
  double_precision: { Price: "0.01" }
  key_fields: { ClOrdID: true, Account: false }
  fail_unexpected: Y
  children:
    NoPartyIDs:
      - key_fields: { PartyID: true }
      - system_precision: { Qty: 100 }
"#;

    #[test]
    fn test_load_yaml_document() {
        let doc = load_settings_yaml(YAML).unwrap();

        assert!(doc.check_groups_order);
        assert!(doc.check_simple_collections_order);
        assert_eq!(doc.unchecked_fields, vec!["SendingTime"]);
        assert_eq!(doc.meta.fail_unexpected, FailUnexpected::Yes);
        assert_eq!(doc.meta.double_precision("Price"), Some(Decimal::new(1, 2)));
        assert!(doc.meta.is_key("ClOrdID"));
        assert!(!doc.meta.is_key("Account"));

        let parties = &doc.meta.children["NoPartyIDs"];
        assert_eq!(parties.len(), 2);
        assert!(parties[0].is_key("PartyID"));
        assert_eq!(parties[1].system_precision("Qty"), Some(Decimal::from(100)));
    }

    #[test]
    fn test_defaults_for_empty_document() {
        let doc = load_settings_json("{}").unwrap();
        assert_eq!(doc, SettingsDocument::default());
        assert!(doc.check_simple_collections_order);
    }

    #[test]
    fn test_invalid_precision_is_rejected() {
        let err = load_settings_json(r#"{"meta": {"double_precision": {"Px": -1}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrecision { .. }));
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = write_file(dir.path(), "settings.yml", YAML);
        let json = write_file(
            dir.path(),
            "settings.json",
            r#"{"keep_result_group_order": true, "meta": {"fail_unexpected": "all"}}"#,
        );
        let txt = write_file(dir.path(), "settings.txt", "");

        assert!(load_settings_file(&yaml).unwrap().check_groups_order);

        let doc = load_settings_file(&json).unwrap();
        assert!(doc.keep_result_group_order);
        assert_eq!(doc.meta.fail_unexpected, FailUnexpected::All);

        assert!(matches!(
            load_settings_file(&txt).unwrap_err(),
            ConfigError::UnsupportedFormat { .. }
        ));
        assert!(matches!(
            load_settings_file(dir.path().join("missing.yaml")).unwrap_err(),
            ConfigError::ReadFile { .. }
        ));
    }

    #[test]
    fn test_parse_errors_carry_format() {
        assert!(matches!(
            load_settings_yaml("meta: [").unwrap_err(),
            ConfigError::ParseYaml { .. }
        ));
        assert!(matches!(
            load_settings_json("{").unwrap_err(),
            ConfigError::ParseJson { .. }
        ));
    }
}
