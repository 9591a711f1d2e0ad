use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tree::MenuTree;
use super::TreeError;
use crate::types::Action;

/// Read/write/delete flags of a feature.
///
/// Flags are optional so an overlay tree can grant or revoke a single flag
/// without restating the others. An absent flag is never treated as an
/// explicit `false` during a merge, but counts as `false` for [`Permissions::allows`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl Permissions {
    pub fn new(read: bool, write: bool, delete: bool) -> Self {
        Self {
            read: Some(read),
            write: Some(write),
            delete: Some(delete),
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        let flag = match action {
            Action::Read => self.read,
            Action::Write => self.write,
            Action::Delete => self.delete,
        };
        flag.unwrap_or(false)
    }

    /// Enable every flag the other side grants
    pub fn or_with(&mut self, other: &Permissions) {
        or_flag(&mut self.read, other.read);
        or_flag(&mut self.write, other.write);
        or_flag(&mut self.delete, other.delete);
    }

    /// Take every flag the other side states, keep the rest
    pub fn overwrite_with(&mut self, other: &Permissions) {
        if other.read.is_some() {
            self.read = other.read;
        }
        if other.write.is_some() {
            self.write = other.write;
        }
        if other.delete.is_some() {
            self.delete = other.delete;
        }
    }
}

pub(crate) fn or_flag(base: &mut Option<bool>, overlay: Option<bool>) {
    if let Some(granted) = overlay {
        *base = Some(base.unwrap_or(false) || granted);
    }
}

/// A single addressable feature of a dashboard menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub feature_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_api: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<MenuTree>,
    /// Fields the typed model does not know about, carried through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MenuNode {
    pub fn new(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            name: None,
            description: None,
            icon: None,
            amount: None,
            visibility: None,
            need_api: None,
            permissions: None,
            features: None,
            extra: Map::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn with_child(mut self, child: MenuNode) -> Self {
        self.features
            .get_or_insert_with(MenuTree::new)
            .insert_node(child);
        self
    }

    /// Whether the feature is shown. Absent visibility means shown.
    pub fn is_visible(&self) -> bool {
        self.visibility.unwrap_or(true)
    }

    pub fn allows(&self, action: Action) -> bool {
        self.permissions.map(|p| p.allows(action)).unwrap_or(false)
    }

    /// Shallow merge: every key of `fields` overwrites the node's key of the same name.
    pub fn apply_fields(&self, fields: &Map<String, Value>) -> Result<MenuNode, TreeError> {
        let mut object = match serde_json::to_value(self)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        for (key, value) in fields {
            object.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(object)).map_err(|e| TreeError::InvalidPatch {
            feature_id: self.feature_id.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let node: MenuNode = serde_json::from_value(json!({
            "feature_id": "leads",
            "name": "Leads",
            "route": "/leads",
            "permissions": {"read": true}
        }))
        .unwrap();

        assert_eq!(node.extra.get("route"), Some(&json!("/leads")));
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["route"], json!("/leads"));
        assert_eq!(back["permissions"], json!({"read": true}));
    }

    #[test]
    fn apply_fields_overwrites_per_key() {
        let node = MenuNode::new("leads").with_permissions(Permissions::new(true, false, false));
        let mut fields = Map::new();
        fields.insert("name".into(), json!("Leads"));
        fields.insert("permissions".into(), json!({"write": true}));

        let patched = node.apply_fields(&fields).unwrap();
        assert_eq!(patched.name.as_deref(), Some("Leads"));
        // shallow: the permissions object is replaced, not merged
        assert_eq!(patched.permissions, Some(Permissions { read: None, write: Some(true), delete: None }));
    }

    #[test]
    fn apply_fields_rejects_malformed_values() {
        let node = MenuNode::new("leads");
        let mut fields = Map::new();
        fields.insert("permissions".into(), json!("everything"));
        assert!(matches!(node.apply_fields(&fields), Err(TreeError::InvalidPatch { .. })));
    }

    #[test]
    fn or_with_only_enables() {
        let mut base = Permissions::new(true, false, false);
        base.or_with(&Permissions { read: Some(false), write: Some(true), delete: None });
        assert_eq!(base, Permissions::new(true, true, false));
    }
}
