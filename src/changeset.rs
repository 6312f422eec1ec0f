use json_patch::Patch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::version::Version;

/// A changeset described as a JSON Patch (RFC 6902).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPatchChangeset {
    /// Version the document has after this changeset is applied.
    pub version: Version,
    /// Operations applied in order.
    pub patch: Patch,
}

/// A changeset described as an update spec for the [`spec_edit`](crate::spec_edit) editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecEditChangeset {
    /// Version the document has after this changeset is applied.
    pub version: Version,
    /// Nested update spec.
    pub spec: Value,
}

/// One recorded, versioned transformation step.
///
/// Changesets are static data: once a version has shipped its changeset must
/// never be edited, only followed by new ones. Serialized changesets carry a
/// `"type"` tag naming their variant:
///
/// ```
/// use json_evolve::{Changeset, ChangesetKind};
///
/// let cs: Changeset = serde_json::from_str(r#"{
///     "type": "JSON_PATCH_CHANGESET",
///     "version": 1,
///     "patch": [{ "op": "add", "path": "/isEnabled", "value": true }]
/// }"#).unwrap();
///
/// assert_eq!(cs.version(), 1);
/// assert_eq!(cs.kind(), ChangesetKind::JsonPatch);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Changeset {
    #[serde(rename = "JSON_PATCH_CHANGESET")]
    JsonPatch(JsonPatchChangeset),
    #[serde(rename = "SPEC_EDIT_CHANGESET")]
    SpecEdit(SpecEditChangeset),
}

/// Discriminant of a [`Changeset`], naming the adapter that applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangesetKind {
    JsonPatch,
    SpecEdit,
}

impl Changeset {
    /// Version the document has after this changeset is applied.
    pub fn version(&self) -> Version {
        match self {
            Self::JsonPatch(cs) => cs.version,
            Self::SpecEdit(cs) => cs.version,
        }
    }

    pub fn kind(&self) -> ChangesetKind {
        match self {
            Self::JsonPatch(_) => ChangesetKind::JsonPatch,
            Self::SpecEdit(_) => ChangesetKind::SpecEdit,
        }
    }
}

impl From<JsonPatchChangeset> for Changeset {
    fn from(cs: JsonPatchChangeset) -> Self {
        Self::JsonPatch(cs)
    }
}

impl From<SpecEditChangeset> for Changeset {
    fn from(cs: SpecEditChangeset) -> Self {
        Self::SpecEdit(cs)
    }
}

/// Build a JSON Patch changeset.
///
/// The patch is not validated here; invalid operations surface when the
/// changeset is applied.
pub fn json_patch_changeset(version: Version, patch: Patch) -> Changeset {
    Changeset::JsonPatch(JsonPatchChangeset { version, patch })
}

/// Build a spec-edit changeset.
///
/// The spec is not validated here; invalid specs surface when the changeset
/// is applied.
pub fn spec_edit_changeset(version: Version, spec: Value) -> Changeset {
    Changeset::SpecEdit(SpecEditChangeset { version, spec })
}
