//! Menu/feature trees and the operations that search, edit and layer them.

pub mod engine;
pub mod merge;
pub mod node;
pub mod tree;

pub use engine::{find_feature, recursive_check, temp_data_func, update_role_controller, ScreenDetail, TreeEdit};
pub use merge::{merge_tree, MergeStrategy};
pub use node::{MenuNode, Permissions};
pub use tree::{MenuPatch, MenuTree, TreeEntry};

use thiserror::Error;

/// Errors from reading or editing menu trees
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Feature {0} not found")]
    FeatureNotFound(String),

    #[error("Invalid menu node '{feature_id}': {message}")]
    InvalidNode { feature_id: String, message: String },

    #[error("Invalid update for '{feature_id}': {message}")]
    InvalidPatch { feature_id: String, message: String },

    #[error("Invalid menu tree: {0}")]
    InvalidTree(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
