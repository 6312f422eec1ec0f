//! # json-evolve
//!
//! Evolve persisted, versioned JSON documents to the latest schema at read
//! time.
//!
//! Every stored document carries the version of the schema it was written
//! with. Schema changes are recorded as a **changelog**: a list of
//! **changesets**, each describing how to transform a document into the next
//! version. Reading an old document then means replaying the changesets it
//! has not seen yet. No offline migration pass is needed.
//!
//! ## Quick Start
//!
//! ```
//! use json_evolve::prelude::*;
//! use serde_json::json;
//!
//! let changelog: Changelog = serde_json::from_value(json!([
//!     {
//!         "type": "JSON_PATCH_CHANGESET",
//!         "version": 1,
//!         "patch": [{ "op": "add", "path": "/isEnabled", "value": true }]
//!     },
//!     {
//!         "type": "SPEC_EDIT_CHANGESET",
//!         "version": 2,
//!         "spec": { "tags": { "$set": [] } }
//!     }
//! ]))
//! .unwrap();
//!
//! let stored = json!({ "version": 0, "name": "legacy" });
//! let current = evolve(&changelog, &stored).unwrap();
//!
//! assert_eq!(
//!     current,
//!     json!({ "version": 2, "name": "legacy", "isEnabled": true, "tags": [] })
//! );
//! assert_eq!(latest_version(&changelog), 2);
//! ```
//!
//! ## Key Concepts
//!
//! - **Order-independent**: changelogs are sorted by version before use.
//! - **Forward only**: only changesets newer than the document run. Every
//!   result is stamped with the changelog's latest version, so a document
//!   claiming a newer version keeps its content but is re-stamped.
//! - **Atomic**: the result is either the fully evolved document or the first
//!   [`EvolutionError`], never a partially evolved document.
//! - **Pure**: no I/O and no shared state; evolving is safe from any thread.
//!
//! ## Changesets
//!
//! - [`JsonPatchChangeset`]: an RFC 6902 JSON Patch, applied with the
//!   [`json-patch`](https://docs.rs/json-patch) crate.
//! - [`SpecEditChangeset`]: a declarative update spec, applied with
//!   [`spec_edit`].
//!
//! Changeset versions must be unique within a changelog. This is a contract
//! on the changelog author: by default it is not checked, see
//! [`Changelog::duplicate_versions`] and
//! [`EvolutionConfig::reject_duplicate_versions`].

mod adapter;
mod changelog;
mod changeset;
mod codec;
mod engine;
mod error;
mod version;

pub mod prelude;
pub mod spec_edit;

pub use adapter::Transformation;
pub use changelog::{latest_version, Changelog};
pub use changeset::{
    json_patch_changeset, spec_edit_changeset, Changeset, ChangesetKind, JsonPatchChangeset,
    SpecEditChangeset,
};
pub use codec::{versioned, Codec, CodecError, JsonCodec, VersionedCodec};
pub use engine::{evolve, evolver, EvolutionConfig, Evolver};
pub use error::EvolutionError;
pub use spec_edit::SpecEditError;
pub use version::{document_version, with_version, Version, BASE_VERSION, VERSION_KEY};
