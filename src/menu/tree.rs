use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::node::MenuNode;
use super::TreeError;

/// Untyped nested patch keyed by feature id, children under `features`.
pub type MenuPatch = Map<String, Value>;

/// One value of a menu map: either a feature node or opaque metadata.
///
/// The split is made once, when the tree is read: an object carrying a
/// `feature_id` key is a node, anything else is metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEntry {
    Node(MenuNode),
    Meta(Value),
}

impl TreeEntry {
    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        match value {
            Value::Object(object) if object.contains_key("feature_id") => {
                let feature_id = object
                    .get("feature_id")
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .unwrap_or_default();
                serde_json::from_value(Value::Object(object))
                    .map(TreeEntry::Node)
                    .map_err(|e| TreeError::InvalidNode {
                        feature_id,
                        message: e.to_string(),
                    })
            }
            other => Ok(TreeEntry::Meta(other)),
        }
    }

    pub fn to_value(&self) -> Result<Value, TreeError> {
        match self {
            TreeEntry::Node(node) => Ok(serde_json::to_value(node)?),
            TreeEntry::Meta(value) => Ok(value.clone()),
        }
    }

    pub fn as_node(&self) -> Option<&MenuNode> {
        match self {
            TreeEntry::Node(node) => Some(node),
            TreeEntry::Meta(_) => None,
        }
    }
}

/// Insertion-ordered map from feature id to [`TreeEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    entries: IndexMap<String, TreeEntry>,
}

impl MenuTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&TreeEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TreeEntry> {
        self.entries.get_mut(key)
    }

    pub fn node(&self, key: &str) -> Option<&MenuNode> {
        self.get(key).and_then(TreeEntry::as_node)
    }

    pub fn node_mut(&mut self, key: &str) -> Option<&mut MenuNode> {
        match self.get_mut(key) {
            Some(TreeEntry::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, entry: TreeEntry) -> Option<TreeEntry> {
        self.entries.insert(key.into(), entry)
    }

    /// Insert a node under its own feature id
    pub fn insert_node(&mut self, node: MenuNode) -> Option<TreeEntry> {
        let key = node.feature_id.clone();
        self.insert(key, TreeEntry::Node(node))
    }

    /// Remove a key; the remaining entries keep their order.
    pub fn remove(&mut self, key: &str) -> Option<TreeEntry> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Node entries only, in order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &MenuNode)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_node().map(|n| (k.as_str(), n)))
    }

    /// Copy of this tree with every metadata entry dropped at the top level
    pub fn only_nodes(&self) -> MenuTree {
        self.entries
            .iter()
            .filter(|(_, v)| matches!(v, TreeEntry::Node(_)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self, TreeError> {
        let mut tree = MenuTree::new();
        for (key, value) in map {
            tree.insert(key, TreeEntry::from_value(value)?);
        }
        Ok(tree)
    }

    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Null => Ok(MenuTree::new()),
            other => Err(TreeError::InvalidTree(format!(
                "expected an object of features, got {}",
                other
            ))),
        }
    }

    pub fn to_value(&self) -> Result<Value, TreeError> {
        let mut map = Map::new();
        for (key, entry) in &self.entries {
            map.insert(key.clone(), entry.to_value()?);
        }
        Ok(Value::Object(map))
    }

    /// Turn a patch into a tree, filling each node's `feature_id` from its key.
    pub fn from_patch(patch: &MenuPatch) -> Result<Self, TreeError> {
        let mut filled = patch.clone();
        fill_feature_ids(&mut filled);
        Self::from_map(filled)
    }

    /// Deep, node-wise application of a patch.
    ///
    /// Fields of a patch node overwrite the stored node's fields one key at a
    /// time; a nested `features` object is applied the same way one level
    /// down. Keys missing from the tree are inserted.
    pub fn merge_patch(&mut self, patch: &MenuPatch) -> Result<(), TreeError> {
        for (key, value) in patch {
            let existing = match (self.node(key), value) {
                (Some(node), Value::Object(fields)) => Some((node.clone(), fields)),
                _ => None,
            };

            match existing {
                Some((node, fields)) => {
                    let mut fields = fields.clone();
                    let children = fields.remove("features");
                    let mut node = node.apply_fields(&fields)?;
                    match children {
                        Some(Value::Object(children)) => {
                            node.features
                                .get_or_insert_with(MenuTree::new)
                                .merge_patch(&children)?;
                        }
                        Some(other) => {
                            let mut single = Map::new();
                            single.insert("features".to_string(), other);
                            node = node.apply_fields(&single)?;
                        }
                        None => {}
                    }
                    self.insert(key.clone(), TreeEntry::Node(node));
                }
                None => {
                    let mut single = Map::new();
                    single.insert(key.clone(), value.clone());
                    for (k, entry) in MenuTree::from_patch(&single)?.entries {
                        self.insert(k, entry);
                    }
                }
            }
        }
        Ok(())
    }

    /// One-level update: every top-level entry of `other` replaces the entry
    /// of the same key wholesale.
    pub fn update_top_level(&mut self, other: MenuTree) {
        for (key, entry) in other.entries {
            self.insert(key, entry);
        }
    }
}

fn fill_feature_ids(map: &mut Map<String, Value>) {
    for (key, value) in map.iter_mut() {
        if let Value::Object(node) = value {
            node.entry("feature_id")
                .or_insert_with(|| Value::String(key.clone()));
            if let Some(Value::Object(children)) = node.get_mut("features") {
                fill_feature_ids(children);
            }
        }
    }
}

impl FromIterator<(String, TreeEntry)> for MenuTree {
    fn from_iter<I: IntoIterator<Item = (String, TreeEntry)>>(iter: I) -> Self {
        let mut tree = MenuTree::new();
        for (key, entry) in iter {
            tree.insert(key, entry);
        }
        tree
    }
}

impl Serialize for MenuTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            match entry {
                TreeEntry::Node(node) => map.serialize_entry(key, node)?,
                TreeEntry::Meta(value) => map.serialize_entry(key, value)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MenuTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        MenuTree::from_map(map).map_err(D::Error::custom)
    }
}
