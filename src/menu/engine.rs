//! Search, edit and flatten operations over nested menu trees.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::MenuNode;
use super::tree::{MenuPatch, MenuTree, TreeEntry};
use super::TreeError;

/// What to do with the entry once it is found
#[derive(Debug, Clone, Copy)]
pub enum TreeEdit<'a> {
    /// Shallow-merge these fields into the entry
    Patch(&'a Map<String, Value>),
    /// Drop the entry from its parent map
    Remove,
}

/// One item of a `screen_details` payload: a partial node update, with
/// optional child updates one level down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDetail {
    pub feature_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<ScreenDetail>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ScreenDetail {
    pub fn new(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            features: None,
            fields: Map::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn child(mut self, child: ScreenDetail) -> Self {
        self.features.get_or_insert_with(Vec::new).push(child);
        self
    }
}

/// Locate `target_id` anywhere in `tree` and apply `edit` to it.
///
/// Every key of a level is compared before any child map is searched;
/// children are then searched in insertion order and the first match wins.
/// Returns the edited copy of the tree, or `None` when no entry matched, in
/// which case nothing was changed.
pub fn recursive_check(
    tree: &MenuTree,
    target_id: &str,
    edit: TreeEdit<'_>,
) -> Result<Option<MenuTree>, TreeError> {
    if let Some(entry) = tree.get(target_id) {
        let mut updated = tree.clone();
        match edit {
            TreeEdit::Remove => {
                updated.remove(target_id);
            }
            TreeEdit::Patch(fields) => {
                updated.insert(target_id, patch_entry(target_id, entry, fields)?);
            }
        }
        return Ok(Some(updated));
    }

    for (key, node) in tree.nodes() {
        let Some(children) = &node.features else {
            continue;
        };
        if let Some(children) = recursive_check(children, target_id, edit)? {
            let mut node = node.clone();
            node.features = Some(children);
            let mut updated = tree.clone();
            updated.insert(key, TreeEntry::Node(node));
            return Ok(Some(updated));
        }
    }

    Ok(None)
}

/// Read-only counterpart of [`recursive_check`], same search order.
pub fn find_feature<'t>(tree: &'t MenuTree, target_id: &str) -> Option<&'t MenuNode> {
    if let Some(entry) = tree.get(target_id) {
        return entry.as_node();
    }
    tree.nodes()
        .filter_map(|(_, node)| node.features.as_ref())
        .find_map(|children| find_feature(children, target_id))
}

fn patch_entry(
    key: &str,
    entry: &TreeEntry,
    fields: &Map<String, Value>,
) -> Result<TreeEntry, TreeError> {
    match entry {
        TreeEntry::Node(node) => Ok(TreeEntry::Node(node.apply_fields(fields)?)),
        TreeEntry::Meta(value) => {
            let mut object = match value {
                Value::Object(object) => object.clone(),
                _ => Map::new(),
            };
            for (k, v) in fields {
                object.insert(k.clone(), v.clone());
            }
            TreeEntry::from_value(Value::Object(object)).map_err(|e| TreeError::InvalidPatch {
                feature_id: key.to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Build (or extend) `reformatted_data` from a `screen_details` payload.
///
/// `master_details` is only consulted to check that every referenced feature
/// exists at the matching level; the first unknown feature id aborts with
/// [`TreeError::FeatureNotFound`]. Entries processed before the failure stay
/// applied.
pub fn update_role_controller(
    payload: &[ScreenDetail],
    reformatted_data: &mut MenuPatch,
    master_details: &MenuTree,
) -> Result<(), TreeError> {
    let no_children = MenuTree::new();

    for detail in payload {
        let master_node = master_details
            .node(&detail.feature_id)
            .ok_or_else(|| TreeError::FeatureNotFound(detail.feature_id.clone()))?;

        match &detail.features {
            Some(children) if !children.is_empty() => {
                let master_children = master_node.features.as_ref().unwrap_or(&no_children);
                let slot = object_slot(reformatted_data, &detail.feature_id)?;
                let child_slot = object_slot(slot, "features")?;
                update_role_controller(children, child_slot, master_children)?;
            }
            _ => {
                let slot = object_slot(reformatted_data, &detail.feature_id)?;
                for (key, value) in &detail.fields {
                    slot.insert(key.clone(), value.clone());
                }
            }
        }
    }

    Ok(())
}

fn object_slot<'m>(
    map: &'m mut Map<String, Value>,
    key: &str,
) -> Result<&'m mut Map<String, Value>, TreeError> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().ok_or_else(|| TreeError::InvalidPatch {
        feature_id: key.to_string(),
        message: "expected an object".to_string(),
    })
}

/// List the nodes of a features map for listing screens.
///
/// Metadata entries are skipped. Every listed node keeps its children,
/// converted the same way into a `features` list.
pub fn temp_data_func(features: &MenuTree) -> Result<Vec<Value>, TreeError> {
    features.nodes().map(|(_, node)| list_node(node)).collect()
}

fn list_node(node: &MenuNode) -> Result<Value, TreeError> {
    let mut value = serde_json::to_value(node)?;
    if let (Some(children), Value::Object(object)) = (&node.features, &mut value) {
        object.insert("features".to_string(), Value::Array(temp_data_func(children)?));
    }
    Ok(value)
}
