//! Deep merge of configuration trees
//!
//! Trees are merged in precedence order, lowest first:
//!
//! - two tables at the same key merge recursively
//! - anything else is replaced wholesale by the later value, lists included
//! - a later `null` is the absent marker and leaves the earlier value alone
//!
//! Enabled/disabled toggles for skills and MCP servers use [`ToggleSet`]
//! instead, since list replacement would lose earlier layers' toggles.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use strata_meta::Tree;

/// Merge `incoming` into `base` in place.
pub fn deep_merge(base: &mut Tree, incoming: &Tree) {
    for (key, value) in incoming {
        if value.is_null() {
            continue;
        }
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Merge a sequence of trees, later trees taking precedence.
///
/// ```
/// use serde_json::json;
/// use strata_core::config::merge;
///
/// let base = json!({"sync": {"backup": true, "target_dir": ".agent"}});
/// let over = json!({"sync": {"backup": false}});
/// let merged = merge([base.as_object().unwrap(), over.as_object().unwrap()]);
///
/// assert_eq!(merged["sync"], json!({"backup": false, "target_dir": ".agent"}));
/// ```
pub fn merge<'a>(trees: impl IntoIterator<Item = &'a Tree>) -> Tree {
    let mut out = Tree::new();
    for tree in trees {
        deep_merge(&mut out, tree);
    }
    out
}

/// Enabled/disabled sets accumulated across layers.
///
/// A later layer enabling an item takes it out of `disabled` and vice versa.
/// Within one layer, disabling wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleSet {
    pub enabled: BTreeSet<String>,
    pub disabled: BTreeSet<String>,
}

impl ToggleSet {
    /// Apply one layer's toggles.
    pub fn apply<'a>(
        &mut self,
        enabled: impl IntoIterator<Item = &'a str>,
        disabled: impl IntoIterator<Item = &'a str>,
    ) {
        for item in enabled {
            self.disabled.remove(item);
            self.enabled.insert(item.to_string());
        }
        for item in disabled {
            self.enabled.remove(item);
            self.disabled.insert(item.to_string());
        }
    }

    /// Apply the `enabled`/`disabled` lists of a group table, if present.
    pub fn apply_group(&mut self, group: Option<&Value>) {
        let Some(group) = group.and_then(Value::as_object) else {
            return;
        };
        self.apply(string_items(group.get("enabled")), string_items(group.get("disabled")));
    }

    pub fn is_enabled(&self, item: &str) -> bool {
        self.enabled.contains(item) && !self.disabled.contains(item)
    }
}

fn string_items(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}
