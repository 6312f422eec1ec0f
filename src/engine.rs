use serde_json::Value;
use tracing::{debug, trace};

use crate::adapter::Transformation;
use crate::changelog::{pending_suffix, Changelog};
use crate::changeset::Changeset;
use crate::error::EvolutionError;
use crate::version::{document_version, with_version, Version, VERSION_KEY};

/// Configuration for the evolution engine.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Attribute that holds the document version.
    ///
    /// Use `"_version"` when the stored records have a `version` field of
    /// their own.
    pub version_key: String,
    /// If true, refuse to evolve anything with a changelog in which two
    /// changesets claim the same version.
    pub reject_duplicate_versions: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            version_key: VERSION_KEY.to_string(),
            reject_duplicate_versions: false,
        }
    }
}

/// Evolves documents against one changelog.
///
/// The changelog is sorted once on construction, so an `Evolver` can be
/// built at startup and shared (it is `Send + Sync`) by every reader.
///
/// # Example
///
/// ```
/// use json_evolve::{json_patch_changeset, spec_edit_changeset, Changelog, Evolver};
/// use serde_json::json;
///
/// let changelog = Changelog::new()
///     .with(spec_edit_changeset(2, json!({ "tags": { "$push": ["new"] } })))
///     .with(json_patch_changeset(
///         1,
///         serde_json::from_value(json!([{ "op": "add", "path": "/tags", "value": [] }])).unwrap(),
///     ));
///
/// let evolver = Evolver::new(changelog);
/// let stored = json!({ "version": 0, "name": "a" });
///
/// let current = evolver.evolve(&stored).unwrap();
/// assert_eq!(current, json!({ "version": 2, "name": "a", "tags": ["new"] }));
/// ```
#[derive(Debug, Clone)]
pub struct Evolver {
    changelog: Changelog,
    latest_version: Version,
    duplicate_versions: Vec<Version>,
    config: EvolutionConfig,
}

impl Evolver {
    /// Create an evolver with the default configuration.
    pub fn new(changelog: impl Into<Changelog>) -> Self {
        Self::with_config(changelog, EvolutionConfig::default())
    }

    /// Create an evolver with a custom configuration.
    pub fn with_config(changelog: impl Into<Changelog>, config: EvolutionConfig) -> Self {
        let changelog = changelog.into().sorted();
        let latest_version = changelog.latest_version();
        let duplicate_versions = changelog.duplicate_versions();
        Self {
            changelog,
            latest_version,
            duplicate_versions,
            config,
        }
    }

    /// The changelog, in ascending version order.
    pub fn changelog(&self) -> &Changelog {
        &self.changelog
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Version every evolved document ends up at.
    pub fn latest_version(&self) -> Version {
        self.latest_version
    }

    /// Changesets a document at `current` still needs, in application order.
    pub fn pending(&self, current: Version) -> &[Changeset] {
        pending_suffix(self.changelog.as_slice(), current)
    }

    /// Check if `document` is older than the latest version.
    pub fn needs_evolution(&self, document: &Value) -> Result<bool, EvolutionError> {
        let current = document_version(document, &self.config.version_key)?;
        Ok(current < self.latest_version)
    }

    /// Evolve `document` to the latest version.
    ///
    /// Pending changesets are applied in ascending version order. The first
    /// failure aborts the run and is returned; `document` itself is never
    /// modified, so a failed evolution leaves nothing half-applied.
    ///
    /// The result always carries the latest version of the changelog, even
    /// when the document claimed a newer one.
    pub fn evolve(&self, document: &Value) -> Result<Value, EvolutionError> {
        if self.config.reject_duplicate_versions && !self.duplicate_versions.is_empty() {
            return Err(EvolutionError::unexpected(format!(
                "changelog has more than one changeset for versions {:?}",
                self.duplicate_versions
            )));
        }

        let key = &self.config.version_key;
        let baseline = document_version(document, key)?;
        let pending = self.pending(baseline);
        run(pending.iter(), document, key, baseline, self.latest_version)
    }
}

/// Fold `pending` over a copy of `document` and stamp the result with `latest`.
fn run<'a>(
    pending: impl ExactSizeIterator<Item = &'a Changeset>,
    document: &Value,
    key: &str,
    baseline: Version,
    latest: Version,
) -> Result<Value, EvolutionError> {
    debug!(
        from = baseline,
        to = latest,
        pending = pending.len(),
        "evolving document"
    );

    let evolved = pending
        .into_iter()
        .try_fold(document.clone(), |current, changeset| {
            trace!(version = changeset.version(), kind = ?changeset.kind(), "applying changeset");
            changeset.apply(current)
        })
        .map_err(|err| {
            debug!(from = baseline, error = %err, "evolution aborted");
            err
        })?;

    with_version(evolved, key, latest)
}

/// Evolve `document` by applying the changesets of `changelog` it has not
/// seen yet, then stamping it with the changelog's latest version.
///
/// The changelog may be in any order. For repeated use build an [`Evolver`]
/// once instead.
pub fn evolve(changelog: &Changelog, document: &Value) -> Result<Value, EvolutionError> {
    let baseline = document_version(document, VERSION_KEY)?;
    let pending = changelog.pending(baseline);
    run(
        pending.into_iter(),
        document,
        VERSION_KEY,
        baseline,
        changelog.latest_version(),
    )
}

/// Curried form of [`evolve`]: bind a changelog now, evolve documents later.
pub fn evolver(changelog: impl Into<Changelog>) -> impl Fn(&Value) -> Result<Value, EvolutionError> {
    let evolver = Evolver::new(changelog);
    move |document| evolver.evolve(document)
}
