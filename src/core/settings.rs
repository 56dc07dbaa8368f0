use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Extra binding names, separated like `PATH` entries.
pub const ENV_CUSTOM_BINDINGS: &str = "QT_CUSTOM_BINDINGS_SUPPORT";
/// JSON object mapping a member name to where it lives in the target binding.
pub const ENV_CUSTOM_MISPLACED_MEMBERS: &str = "QT_CUSTOM_MISPLACED_MEMBERS";

#[cfg(windows)]
const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: char = ':';

/// Process-wide configuration consumed by the registry.
///
/// Established once at startup and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub supported_bindings: Vec<String>,
    pub misplaced_members: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supported_bindings: default_supported_bindings(),
            misplaced_members: BTreeMap::new(),
        }
    }
}

fn default_supported_bindings() -> Vec<String> {
    ["PySide2", "PySide", "PyQt5", "PyQt4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// Malformed misplaced-member JSON is fatal: the caller should abort
    /// before processing any source.
    pub fn from_env() -> Result<Self> {
        let bindings = std::env::var(ENV_CUSTOM_BINDINGS).ok();
        let misplaced = std::env::var(ENV_CUSTOM_MISPLACED_MEMBERS).ok();
        Self::from_values(bindings.as_deref(), misplaced.as_deref())
    }

    /// Build settings from raw variable values (`None` = unset).
    pub fn from_values(custom_bindings: Option<&str>, misplaced_members: Option<&str>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(raw) = custom_bindings.filter(|raw| !raw.trim().is_empty()) {
            let extra = parse_binding_list(raw)?;
            crate::log_status!("settings", "Found custom bindings. Adding: {}", extra.join(", "));
            for name in extra {
                if !settings.supported_bindings.contains(&name) {
                    settings.supported_bindings.push(name);
                }
            }
        }

        if let Some(raw) = misplaced_members.filter(|raw| !raw.trim().is_empty()) {
            crate::log_status!("settings", "{} = {:?}", ENV_CUSTOM_MISPLACED_MEMBERS, raw);
            settings.misplaced_members = serde_json::from_str(raw)
                .map_err(|e| Error::config_invalid_json(ENV_CUSTOM_MISPLACED_MEMBERS, e))?;
            crate::log_status!(
                "settings",
                "Resolved {} misplaced member(s)",
                settings.misplaced_members.len()
            );
        }

        Ok(settings)
    }
}

fn parse_binding_list(raw: &str) -> Result<Vec<String>> {
    raw.split(PATH_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let valid = name
                .split('.')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'));
            if valid {
                Ok(name.to_string())
            } else {
                Err(Error::config_invalid_value(
                    ENV_CUSTOM_BINDINGS,
                    Some(name.to_string()),
                    "Binding names must be importable module names",
                ))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn defaults_list_builtin_bindings() {
        let settings = Settings::default();
        assert_eq!(
            settings.supported_bindings,
            vec!["PySide2", "PySide", "PyQt5", "PyQt4"]
        );
        assert!(settings.misplaced_members.is_empty());
    }

    #[test]
    fn unset_values_yield_defaults() {
        assert_eq!(Settings::from_values(None, None).unwrap(), Settings::default());
    }

    #[test]
    fn custom_bindings_are_appended_once() {
        let raw = format!("MyQt{}PyQt5{} Vendor.Qt ", PATH_LIST_SEPARATOR, PATH_LIST_SEPARATOR);
        let settings = Settings::from_values(Some(&raw), None).unwrap();
        assert_eq!(
            settings.supported_bindings,
            vec!["PySide2", "PySide", "PyQt5", "PyQt4", "MyQt", "Vendor.Qt"]
        );
    }

    #[test]
    fn invalid_binding_name_is_rejected() {
        let err = Settings::from_values(Some("My Qt"), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }

    #[test]
    fn misplaced_members_parse_from_json() {
        let settings = Settings::from_values(
            None,
            Some(r#"{"QtCore.QStringListModel": "QtGui.QStringListModel"}"#),
        )
        .unwrap();
        assert_eq!(
            settings.misplaced_members.get("QtCore.QStringListModel").map(String::as_str),
            Some("QtGui.QStringListModel")
        );
    }

    #[test]
    fn malformed_misplaced_members_is_fatal() {
        let err = Settings::from_values(None, Some("{not json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
        assert_eq!(err.details["source"], ENV_CUSTOM_MISPLACED_MEMBERS);
    }

    #[test]
    fn misplaced_members_must_be_an_object_of_strings() {
        let err = Settings::from_values(None, Some(r#"["QtCore"]"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
    }
}
