use serde_json::Value;

use crate::changeset::{Changeset, JsonPatchChangeset, SpecEditChangeset};
use crate::error::EvolutionError;
use crate::spec_edit;
use crate::version::Version;

/// A single changeset that transforms a document into its next version.
///
/// Implementations must be **deterministic and pure**: the same document and
/// changeset always produce the same result, and adapter failures are turned
/// into an [`EvolutionError`] before they leave [`Transformation::apply`].
pub trait Transformation {
    /// Version the document has once this transformation succeeded.
    fn version(&self) -> Version;

    /// Transform `document`, consuming it.
    fn apply(&self, document: Value) -> Result<Value, EvolutionError>;
}

impl Transformation for JsonPatchChangeset {
    fn version(&self) -> Version {
        self.version
    }

    fn apply(&self, mut document: Value) -> Result<Value, EvolutionError> {
        json_patch::patch(&mut document, &self.patch).map_err(|source| {
            EvolutionError::JsonPatch {
                version: self.version,
                source,
            }
        })?;
        Ok(document)
    }
}

impl Transformation for SpecEditChangeset {
    fn version(&self) -> Version {
        self.version
    }

    fn apply(&self, document: Value) -> Result<Value, EvolutionError> {
        spec_edit::apply(&document, &self.spec).map_err(|source| EvolutionError::SpecEdit {
            version: self.version,
            source,
        })
    }
}

impl Transformation for Changeset {
    fn version(&self) -> Version {
        Changeset::version(self)
    }

    fn apply(&self, document: Value) -> Result<Value, EvolutionError> {
        match self {
            Self::JsonPatch(cs) => cs.apply(document),
            Self::SpecEdit(cs) => cs.apply(document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::{json_patch_changeset, spec_edit_changeset};
    use serde_json::json;

    fn patch_changeset(version: Version, ops: Value) -> Changeset {
        json_patch_changeset(version, serde_json::from_value(ops).unwrap())
    }

    #[test]
    fn json_patch_applies_all_operations() {
        let cs = patch_changeset(
            2,
            json!([
                { "op": "add", "path": "/b", "value": { "c": [] } },
                { "op": "copy", "from": "/a", "path": "/b/c" },
                { "op": "move", "from": "/a", "path": "/d" },
                { "op": "replace", "path": "/flag", "value": true },
                { "op": "test", "path": "/flag", "value": true },
                { "op": "remove", "path": "/gone" }
            ]),
        );
        let out = cs
            .apply(json!({ "a": [1], "flag": false, "gone": 0 }))
            .unwrap();
        assert_eq!(out, json!({ "b": { "c": [1] }, "d": [1], "flag": true }));
    }

    #[test]
    fn json_patch_copy_from_missing_path_fails() {
        let cs = patch_changeset(
            2,
            json!([{ "op": "copy", "from": "/nonExistingSourcePath", "path": "/x" }]),
        );
        let err = cs.apply(json!({ "a": 1 })).unwrap_err();
        assert!(matches!(err, EvolutionError::JsonPatch { version: 2, .. }));
        assert_eq!(err.code(), "JSON_PATCH_EVOLUTION_ERROR");
    }

    #[test]
    fn json_patch_failed_test_operation() {
        let cs = patch_changeset(4, json!([{ "op": "test", "path": "/a", "value": 2 }]));
        let err = cs.apply(json!({ "a": 1 })).unwrap_err();
        assert_eq!(err.version(), Some(4));
    }

    #[test]
    fn spec_edit_applies_spec() {
        let cs = spec_edit_changeset(1, json!({ "list": { "$push": [2] } }));
        let out = cs.apply(json!({ "list": [1] })).unwrap();
        assert_eq!(out, json!({ "list": [1, 2] }));
    }

    #[test]
    fn spec_edit_failure_is_wrapped() {
        let cs = spec_edit_changeset(5, json!({ "missing": { "$push": [1] } }));
        let err = cs.apply(json!({})).unwrap_err();
        match err {
            EvolutionError::SpecEdit { version, source } => {
                assert_eq!(version, 5);
                assert_eq!(
                    source,
                    spec_edit::SpecEditError::MissingTarget {
                        path: "/missing".into()
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dispatch_reports_changeset_version() {
        let cs = spec_edit_changeset(9, json!({}));
        assert_eq!(Transformation::version(&cs), 9);
    }
}
