use thiserror::Error;

use crate::spec_edit::SpecEditError;
use crate::version::Version;

/// Error returned when a document cannot be evolved.
///
/// Exactly one error is reported per evolution: the first changeset that
/// failed aborts the whole run.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// A JSON Patch changeset could not be applied.
    #[error("failed to apply JSON patch changeset with version {version}: {source}")]
    JsonPatch {
        /// Version of the offending changeset.
        version: Version,
        /// Failure reported by the patch interpreter.
        #[source]
        source: json_patch::PatchError,
    },
    /// A spec-edit changeset could not be applied.
    #[error("failed to apply spec edit changeset with version {version}: {source}")]
    SpecEdit {
        /// Version of the offending changeset.
        version: Version,
        /// Failure reported by the spec editor.
        #[source]
        source: SpecEditError,
    },
    /// Any failure that is not attributable to a single changeset adapter.
    #[error("unexpected evolution error: {message}")]
    Unexpected {
        /// Human-readable description.
        message: String,
    },
}

impl EvolutionError {
    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Stable, machine-readable code for this error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::JsonPatch { .. } => "JSON_PATCH_EVOLUTION_ERROR",
            Self::SpecEdit { .. } => "SPEC_EDIT_EVOLUTION_ERROR",
            Self::Unexpected { .. } => "UNEXPECTED_EVOLUTION_ERROR",
        }
    }

    /// Version of the changeset that failed, if the failure came from one.
    pub fn version(&self) -> Option<Version> {
        match self {
            Self::JsonPatch { version, .. } | Self::SpecEdit { version, .. } => Some(*version),
            Self::Unexpected { .. } => None,
        }
    }
}
