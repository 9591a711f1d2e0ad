// handlers/mod.rs - HTTP handlers
//
// public: service info and health, no /api prefix
// api:    permission resolution and role/group administration under /api/*
//
// Callers are trusted: the acting user is named in the path, not taken from
// a token.
pub mod api;
pub mod public;

use crate::error::ApiError;
use crate::types::ObjectId;

/// Parse an optional id from a query string. Empty strings count as absent.
pub(crate) fn optional_id(raw: &Option<String>) -> Result<Option<ObjectId>, ApiError> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => Ok(Some(ObjectId::parse(raw)?)),
    }
}
