//! Reading and stamping the version attribute of a document.
//!
//! A versioned document is a JSON object carrying its schema version as a
//! non-negative integer attribute. Documents without the attribute predate
//! the first changeset and are at [`BASE_VERSION`].

use serde_json::Value;

use crate::error::EvolutionError;

/// Schema version number.
pub type Version = u32;

/// Version of any document that predates the first recorded changeset.
pub const BASE_VERSION: Version = 0;

/// Default attribute holding the version of a document.
pub const VERSION_KEY: &str = "version";

/// Read the version of `document` stored under `key`.
///
/// A missing attribute means [`BASE_VERSION`]. Non-object documents and
/// attributes that are not a `u32` are rejected.
pub fn document_version(document: &Value, key: &str) -> Result<Version, EvolutionError> {
    let object = document.as_object().ok_or_else(|| {
        EvolutionError::unexpected(format!(
            "versioned document must be a JSON object, got {}",
            kind_of(document)
        ))
    })?;

    match object.get(key) {
        None => Ok(BASE_VERSION),
        Some(raw) => parse_version(raw).ok_or_else(|| {
            EvolutionError::unexpected(format!(
                "attribute `{key}` must be a non-negative integer version, got {raw}"
            ))
        }),
    }
}

/// Return `document` with its `key` attribute set to `version`.
pub fn with_version(mut document: Value, key: &str, version: Version) -> Result<Value, EvolutionError> {
    match document.as_object_mut() {
        Some(object) => {
            object.insert(key.to_string(), Value::from(version));
            Ok(document)
        }
        None => Err(EvolutionError::unexpected(format!(
            "cannot stamp version {version} on a JSON {}",
            kind_of(&document)
        ))),
    }
}

pub(crate) fn parse_version(raw: &Value) -> Option<Version> {
    raw.as_u64().and_then(|v| Version::try_from(v).ok())
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
