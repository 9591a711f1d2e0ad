use serde_json::Value;

use super::node::{or_flag, MenuNode};
use super::tree::{MenuTree, TreeEntry};

/// How an overlay tree is layered onto a base tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Group overlays: booleans are OR-ed, so an overlay can only enable.
    /// Other fields fill gaps but never replace what the base already has.
    OverlayBooleanOr,
    /// College overrides: every field the overlay states wins.
    OverlayReplace,
}

impl MergeStrategy {
    pub fn from_bool_check(bool_check: bool) -> Self {
        if bool_check {
            MergeStrategy::OverlayBooleanOr
        } else {
            MergeStrategy::OverlayReplace
        }
    }
}

/// Layer `overlay` onto `base` in place.
///
/// Nodes missing from the base are copied in whole. Nodes present on both
/// sides are merged field by field per `strategy`, and their children
/// recursively with the same strategy.
pub fn merge_tree(base: &mut MenuTree, overlay: &MenuTree, strategy: MergeStrategy) {
    for (key, incoming) in overlay.iter() {
        match (base.get_mut(key), incoming) {
            (Some(TreeEntry::Node(existing)), TreeEntry::Node(incoming)) => {
                merge_node(existing, incoming, strategy);
            }
            (Some(TreeEntry::Meta(existing)), TreeEntry::Meta(incoming)) => {
                merge_value(existing, incoming, strategy);
            }
            (Some(TreeEntry::Node(_)), TreeEntry::Meta(_)) => {
                if strategy == MergeStrategy::OverlayReplace {
                    base.insert(key, incoming.clone());
                }
            }
            (Some(TreeEntry::Meta(_)), TreeEntry::Node(_)) | (None, _) => {
                base.insert(key, incoming.clone());
            }
        }
    }
}

fn merge_node(base: &mut MenuNode, overlay: &MenuNode, strategy: MergeStrategy) {
    match (&mut base.permissions, &overlay.permissions) {
        (Some(existing), Some(incoming)) => match strategy {
            MergeStrategy::OverlayBooleanOr => existing.or_with(incoming),
            MergeStrategy::OverlayReplace => existing.overwrite_with(incoming),
        },
        (None, Some(incoming)) => base.permissions = Some(*incoming),
        (_, None) => {}
    }

    merge_flag(&mut base.visibility, overlay.visibility, strategy);
    merge_flag(&mut base.need_api, overlay.need_api, strategy);

    merge_option(&mut base.name, &overlay.name, strategy);
    merge_option(&mut base.description, &overlay.description, strategy);
    merge_option(&mut base.icon, &overlay.icon, strategy);
    merge_option(&mut base.amount, &overlay.amount, strategy);

    for (key, incoming) in &overlay.extra {
        match base.extra.get_mut(key) {
            Some(existing) => merge_value(existing, incoming, strategy),
            None => {
                base.extra.insert(key.clone(), incoming.clone());
            }
        }
    }

    match (&mut base.features, &overlay.features) {
        (Some(existing), Some(incoming)) => merge_tree(existing, incoming, strategy),
        (None, Some(incoming)) => base.features = Some(incoming.clone()),
        (_, None) => {}
    }
}

fn merge_flag(base: &mut Option<bool>, overlay: Option<bool>, strategy: MergeStrategy) {
    match strategy {
        MergeStrategy::OverlayBooleanOr => or_flag(base, overlay),
        MergeStrategy::OverlayReplace => {
            if overlay.is_some() {
                *base = overlay;
            }
        }
    }
}

fn merge_option<T: Clone>(base: &mut Option<T>, overlay: &Option<T>, strategy: MergeStrategy) {
    let take = match strategy {
        MergeStrategy::OverlayBooleanOr => base.is_none(),
        MergeStrategy::OverlayReplace => overlay.is_some(),
    };
    if take {
        if let Some(value) = overlay {
            *base = Some(value.clone());
        }
    }
}

fn merge_value(base: &mut Value, overlay: &Value, strategy: MergeStrategy) {
    let merged = match (strategy, &*base, overlay) {
        (MergeStrategy::OverlayBooleanOr, Value::Bool(a), Value::Bool(b)) => Value::Bool(*a || *b),
        (MergeStrategy::OverlayBooleanOr, Value::Null, _) => overlay.clone(),
        (MergeStrategy::OverlayBooleanOr, _, _) => return,
        (MergeStrategy::OverlayReplace, _, _) => overlay.clone(),
    };
    *base = merged;
}
