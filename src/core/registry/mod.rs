//! Run-wide conversion state: detected bindings, aliases, usage, warnings
//! and unfixable-construct records.
//!
//! One `Registry` is built per run from the loaded `Settings` and handed by
//! `&mut` to every pass that reads or records state. It has no internal
//! locking; parallel callers keep one registry per unit of work and fold
//! them together with `merge_from`.

mod merge;

pub use merge::{merge, StateMap, StateValue};

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::report::ErrorRecord;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKey {
    Bindings,
    RootAliases,
    Used,
    Warnings,
    Errors,
}

impl RegistryKey {
    pub const ALL: [RegistryKey; 5] = [
        RegistryKey::Bindings,
        RegistryKey::RootAliases,
        RegistryKey::Used,
        RegistryKey::Warnings,
        RegistryKey::Errors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKey::Bindings => "bindings",
            RegistryKey::RootAliases => "root_aliases",
            RegistryKey::Used => "used",
            RegistryKey::Warnings => "warnings",
            RegistryKey::Errors => "errors",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registry {
    #[serde(skip)]
    settings: Settings,
    bindings: BTreeSet<String>,
    root_aliases: BTreeSet<String>,
    used: BTreeSet<String>,
    warnings: BTreeSet<String>,
    errors: BTreeSet<ErrorRecord>,
}

impl Registry {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            bindings: BTreeSet::new(),
            root_aliases: BTreeSet::new(),
            used: BTreeSet::new(),
            warnings: BTreeSet::new(),
            errors: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn names(&self, key: RegistryKey) -> Option<&BTreeSet<String>> {
        match key {
            RegistryKey::Bindings => Some(&self.bindings),
            RegistryKey::RootAliases => Some(&self.root_aliases),
            RegistryKey::Used => Some(&self.used),
            RegistryKey::Warnings => Some(&self.warnings),
            RegistryKey::Errors => None,
        }
    }

    fn names_mut(&mut self, key: RegistryKey) -> Option<&mut BTreeSet<String>> {
        match key {
            RegistryKey::Bindings => Some(&mut self.bindings),
            RegistryKey::RootAliases => Some(&mut self.root_aliases),
            RegistryKey::Used => Some(&mut self.used),
            RegistryKey::Warnings => Some(&mut self.warnings),
            RegistryKey::Errors => None,
        }
    }

    /// Add a name to one of the name sets. Returns whether it was new.
    ///
    /// `errors` only takes records, through `add_error` or `report::report`.
    pub fn add(&mut self, key: RegistryKey, name: impl Into<String>) -> Result<bool> {
        let set = self.names_mut(key).ok_or_else(|| {
            Error::validation_invalid_argument(
                key.as_str(),
                "The errors set holds error records, not names",
            )
        })?;
        Ok(set.insert(name.into()))
    }

    pub fn add_error(&mut self, record: ErrorRecord) -> bool {
        self.errors.insert(record)
    }

    pub fn contains(&self, key: RegistryKey, name: &str) -> bool {
        self.names(key).map(|set| set.contains(name)).unwrap_or(false)
    }

    pub fn iter(&self, key: RegistryKey) -> impl Iterator<Item = &str> {
        self.names(key)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.errors.iter()
    }

    pub fn len(&self, key: RegistryKey) -> usize {
        match key {
            RegistryKey::Errors => self.errors.len(),
            other => self.names(other).map(BTreeSet::len).unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        RegistryKey::ALL.iter().all(|key| self.len(*key) == 0)
    }

    /// Reset all five sets. Settings are kept.
    pub fn clear(&mut self) {
        crate::log_status!("registry", "Cleaning the registry");
        self.bindings = BTreeSet::new();
        self.root_aliases = BTreeSet::new();
        self.used = BTreeSet::new();
        self.warnings = BTreeSet::new();
        self.errors = BTreeSet::new();
    }

    /// Union `other`'s sets into this registry (all sets when `keys` is `None`).
    pub fn merge_from(&mut self, other: &Registry, keys: Option<&[RegistryKey]>) {
        let keys = keys.unwrap_or(&RegistryKey::ALL);
        for key in keys {
            match key {
                RegistryKey::Errors => self.errors.extend(other.errors.iter().cloned()),
                name_key => {
                    if let (Some(ours), Some(theirs)) = (self.names_mut(*name_key), other.names(*name_key)) {
                        ours.extend(theirs.iter().cloned());
                    }
                }
            }
        }
    }

    /// Export the name sets as a generic state map for `merge`.
    pub fn to_state(&self) -> StateMap {
        RegistryKey::ALL
            .iter()
            .filter_map(|key| {
                self.names(*key)
                    .map(|set| (key.as_str().to_string(), StateValue::Set(set.clone())))
            })
            .collect()
    }

    pub fn is_supported_binding(&self, name: &str) -> bool {
        self.settings.supported_bindings.iter().any(|b| b == name)
    }

    /// Where a misplaced member lives in the target binding, if configured.
    pub fn misplaced_target(&self, member: &str) -> Option<&str> {
        self.settings.misplaced_members.get(member).map(String::as_str)
    }

    /// Record an import statement, returning the binding it resolves to.
    ///
    /// `import PyQt4.QtCore` binds the root name `PyQt4`, so the root becomes
    /// an alias. `import PyQt4 as Qt` makes `Qt` the alias. An aliased
    /// submodule import (`import PyQt4.QtCore as QtCore`) names no root.
    pub fn record_import(&mut self, module: &str, alias: Option<&str>) -> Option<String> {
        let binding = self
            .settings
            .supported_bindings
            .iter()
            .filter(|b| module == b.as_str() || module.starts_with(&format!("{}.", b)))
            .max_by_key(|b| b.len())?
            .clone();

        let root_alias = match alias {
            Some(alias) if module == binding => Some(alias.to_string()),
            Some(_) => None,
            None => module.split('.').next().map(str::to_string),
        };

        self.bindings.insert(binding.clone());
        if let Some(root_alias) = root_alias {
            self.root_aliases.insert(root_alias);
        }

        Some(binding)
    }
}
