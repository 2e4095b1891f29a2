//! Strongly-typed identifiers for particles, cells, and datasets.

use std::fmt;

/// Globally unique particle identifier.
///
/// Allocated in contiguous blocks by the id allocator so that no two
/// processes ever hand out overlapping ids across a whole run. A freshly
/// created seed candidate carries [`ParticleId::UNASSIGNED`] until its
/// block is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub i64);

impl ParticleId {
    /// Sentinel for a particle that has not been assigned an id yet.
    pub const UNASSIGNED: ParticleId = ParticleId(-1);

    /// Whether this id has been assigned.
    pub fn is_assigned(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticleId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Identifies the seed source (injection object) a particle came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub i32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SourceId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

/// Index of a cell within a dataset block.
///
/// Used as a spatial-search cache hint; [`CellId::NONE`] marks an invalid
/// or not-yet-resolved hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub i64);

impl CellId {
    /// Sentinel for an invalid or unresolved cell hint.
    pub const NONE: CellId = CellId(-1);
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CellId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Index of a dataset block within the local subdomain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataSetId(pub i32);

impl fmt::Display for DataSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for DataSetId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}
