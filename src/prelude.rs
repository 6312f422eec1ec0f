//! Convenient re-exports for common usage.
//!
//! ```
//! use json_evolve::prelude::*;
//! ```

pub use crate::evolve;
pub use crate::json_patch_changeset;
pub use crate::latest_version;
pub use crate::spec_edit_changeset;
pub use crate::versioned;
pub use crate::Changelog;
pub use crate::Changeset;
pub use crate::Codec;
pub use crate::EvolutionError;
pub use crate::Evolver;
pub use crate::JsonCodec;
pub use crate::Transformation;
