//! Key-by-key merging of loosely typed state maps.
//!
//! Sets combine by union and text by concatenation. A key missing on one
//! side takes the empty value of the other side's type. Values with no
//! merge rule are rejected instead of passed through.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Set(BTreeSet<String>),
    Text(String),
    Other(serde_json::Value),
}

pub type StateMap = BTreeMap<String, StateValue>;

impl StateValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StateValue::Set(_) => "set",
            StateValue::Text(_) => "text",
            StateValue::Other(_) => "other",
        }
    }

    /// Empty value of the same kind, or `None` when the kind has no zero.
    fn zero_like(&self) -> Option<StateValue> {
        match self {
            StateValue::Set(_) => Some(StateValue::Set(BTreeSet::new())),
            StateValue::Text(_) => Some(StateValue::Text(String::new())),
            StateValue::Other(_) => None,
        }
    }
}

impl<S: Into<String>> FromIterator<S> for StateValue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StateValue::Set(iter.into_iter().map(Into::into).collect())
    }
}

/// Merge `rhs` into a copy of `lhs`, returning only the merged keys.
///
/// `keys` selects what to merge. Without it, `lhs`'s keys are used, plus
/// `rhs`'s when `keys_both` is set.
pub fn merge(
    lhs: &StateMap,
    rhs: &StateMap,
    keys: Option<&[&str]>,
    keys_both: bool,
) -> Result<StateMap> {
    let selected: BTreeSet<&str> = match keys {
        Some(keys) if !keys.is_empty() => keys.iter().copied().collect(),
        _ if keys_both => lhs.keys().chain(rhs.keys()).map(String::as_str).collect(),
        _ => lhs.keys().map(String::as_str).collect(),
    };

    let mut out = StateMap::new();
    for key in selected {
        let merged = match (lhs.get(key), rhs.get(key)) {
            (Some(left), Some(right)) => combine(key, left, right)?,
            (Some(only), None) | (None, Some(only)) => {
                let zero = only
                    .zero_like()
                    .ok_or_else(|| Error::state_unsupported_merge(key, only.type_name(), "missing"))?;
                if lhs.contains_key(key) {
                    combine(key, only, &zero)?
                } else {
                    combine(key, &zero, only)?
                }
            }
            (None, None) => return Err(Error::state_missing_key(key)),
        };
        out.insert(key.to_string(), merged);
    }

    Ok(out)
}

fn combine(key: &str, left: &StateValue, right: &StateValue) -> Result<StateValue> {
    match (left, right) {
        (StateValue::Set(a), StateValue::Set(b)) => Ok(StateValue::Set(a.union(b).cloned().collect())),
        (StateValue::Text(a), StateValue::Text(b)) => Ok(StateValue::Text(format!("{}{}", a, b))),
        _ => Err(Error::state_unsupported_merge(
            key,
            left.type_name(),
            right.type_name(),
        )),
    }
}
