use serde::{Deserialize, Serialize};

use crate::changeset::Changeset;
use crate::version::{Version, BASE_VERSION};

/// The full history of changesets for one schema lineage.
///
/// Construction order is irrelevant: every query orders the changesets by
/// version first. Sorting is stable, so changesets sharing a version keep
/// their relative order. Duplicate versions are a caller error that is not
/// checked here; see [`Changelog::duplicate_versions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelog {
    changesets: Vec<Changeset>,
}

impl Changelog {
    /// Create an empty changelog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a changeset.
    pub fn push(&mut self, changeset: impl Into<Changeset>) {
        self.changesets.push(changeset.into());
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, changeset: impl Into<Changeset>) -> Self {
        self.push(changeset);
        self
    }

    pub fn len(&self) -> usize {
        self.changesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changesets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Changeset> {
        self.changesets.iter()
    }

    pub fn as_slice(&self) -> &[Changeset] {
        &self.changesets
    }

    /// A copy of this changelog sorted by ascending version.
    pub fn sorted(&self) -> Changelog {
        let mut changesets = self.changesets.clone();
        sort_by_version(&mut changesets);
        Self { changesets }
    }

    /// Whether the changesets are already in ascending version order.
    pub fn is_sorted(&self) -> bool {
        self.changesets
            .windows(2)
            .all(|pair| pair[0].version() <= pair[1].version())
    }

    /// Latest version described by this changelog, or [`BASE_VERSION`] if empty.
    pub fn latest_version(&self) -> Version {
        self.changesets
            .iter()
            .map(Changeset::version)
            .max()
            .unwrap_or(BASE_VERSION)
    }

    /// Changesets not yet applied to a document at version `current`, in
    /// ascending version order.
    pub fn pending(&self, current: Version) -> Vec<&Changeset> {
        let mut sorted: Vec<&Changeset> = self.changesets.iter().collect();
        sorted.sort_by_key(|cs| cs.version());
        let start = pending_start(&sorted, current, |cs| cs.version());
        sorted.split_off(start)
    }

    /// All versions in ascending order.
    pub fn versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = self.changesets.iter().map(Changeset::version).collect();
        versions.sort_unstable();
        versions
    }

    /// Versions claimed by more than one changeset, ascending and deduplicated.
    pub fn duplicate_versions(&self) -> Vec<Version> {
        let mut duplicates: Vec<Version> = self
            .versions()
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .map(|pair| pair[0])
            .collect();
        duplicates.dedup();
        duplicates
    }
}

/// Stable ascending sort by changeset version.
pub(crate) fn sort_by_version(changesets: &mut [Changeset]) {
    changesets.sort_by_key(Changeset::version);
}

/// Trailing run of an ascending slice whose versions are newer than `current`.
pub(crate) fn pending_suffix(sorted: &[Changeset], current: Version) -> &[Changeset] {
    &sorted[pending_start(sorted, current, Changeset::version)..]
}

/// Index where the pending suffix starts: walk back from the tail while
/// versions are newer than `current`.
fn pending_start<T>(sorted: &[T], current: Version, version: impl Fn(&T) -> Version) -> usize {
    sorted
        .iter()
        .rposition(|item| version(item) <= current)
        .map_or(0, |i| i + 1)
}

/// Latest version of `changelog`, or [`BASE_VERSION`] if it is empty.
///
/// Independent of the order of the changesets.
pub fn latest_version(changelog: &Changelog) -> Version {
    changelog.latest_version()
}

impl From<Vec<Changeset>> for Changelog {
    fn from(changesets: Vec<Changeset>) -> Self {
        Self { changesets }
    }
}

impl FromIterator<Changeset> for Changelog {
    fn from_iter<I: IntoIterator<Item = Changeset>>(iter: I) -> Self {
        Self {
            changesets: iter.into_iter().collect(),
        }
    }
}

impl Extend<Changeset> for Changelog {
    fn extend<I: IntoIterator<Item = Changeset>>(&mut self, iter: I) {
        self.changesets.extend(iter);
    }
}

impl IntoIterator for Changelog {
    type Item = Changeset;
    type IntoIter = std::vec::IntoIter<Changeset>;

    fn into_iter(self) -> Self::IntoIter {
        self.changesets.into_iter()
    }
}

impl<'a> IntoIterator for &'a Changelog {
    type Item = &'a Changeset;
    type IntoIter = std::slice::Iter<'a, Changeset>;

    fn into_iter(self) -> Self::IntoIter {
        self.changesets.iter()
    }
}
