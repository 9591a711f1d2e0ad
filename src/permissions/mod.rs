//! Effective-permission resolution: role tree, then group overlays, then the
//! college override.

pub mod resolver;

pub use resolver::{PermissionResolver, ResolvedPermissions};

use thiserror::Error;

use crate::database::StoreError;
use crate::menu::TreeError;
use crate::types::TypeError;

/// Domain errors raised by the resolver and the administration services
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("{0}")]
    ObjectIdInvalid(String),

    #[error("{0}")]
    DataNotFound(String),

    #[error("{0}")]
    Custom(String),

    #[error("{0}")]
    NotEnoughPermission(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Menu tree error: {0}")]
    Tree(TreeError),
}

impl PermissionError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        PermissionError::DataNotFound(format!("{} not found", what))
    }

    pub fn custom(message: impl Into<String>) -> Self {
        PermissionError::Custom(message.into())
    }
}

impl From<StoreError> for PermissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => PermissionError::not_found(what),
            StoreError::Duplicate(what) => PermissionError::Custom(format!("{} already exists", what)),
            other => PermissionError::Store(other),
        }
    }
}

impl From<TreeError> for PermissionError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::FeatureNotFound(_) => PermissionError::DataNotFound(err.to_string()),
            TreeError::InvalidPatch { .. } | TreeError::InvalidNode { .. } => {
                PermissionError::Custom(err.to_string())
            }
            other => PermissionError::Tree(other),
        }
    }
}

impl From<TypeError> for PermissionError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::ObjectIdInvalid(_) => PermissionError::ObjectIdInvalid(err.to_string()),
            other => PermissionError::Custom(other.to_string()),
        }
    }
}
