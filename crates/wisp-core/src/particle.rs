//! The per-particle state record and integration status codes.

use std::fmt;

use crate::id::{CellId, DataSetId, ParticleId, SourceId};

/// Outcome of the most recent integration attempt for a particle.
///
/// Stored on every [`ParticleRecord`] and carried across process
/// boundaries as a single byte tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParticleStatus {
    /// The last step completed normally.
    #[default]
    Ok,
    /// The integrator terminated the particle (max age, zero velocity).
    Terminated,
    /// The particle left the overall simulation bounds.
    OutOfDomain,
    /// The particle's time coordinate fell outside the cached time
    /// bracket beyond tolerance. Reported, not fatal — the particle is
    /// still processed.
    OutOfTimeWindow,
    /// The integrator failed to advance the particle.
    IntegrationFailed,
}

impl ParticleStatus {
    /// Wire tag for this status.
    pub fn as_tag(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Terminated => 1,
            Self::OutOfDomain => 2,
            Self::OutOfTimeWindow => 3,
            Self::IntegrationFailed => 4,
        }
    }

    /// Decode a wire tag; `None` for an unrecognized value.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Ok),
            1 => Some(Self::Terminated),
            2 => Some(Self::OutOfDomain),
            3 => Some(Self::OutOfTimeWindow),
            4 => Some(Self::IntegrationFailed),
            _ => None,
        }
    }
}

impl fmt::Display for ParticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Terminated => "terminated",
            Self::OutOfDomain => "out of domain",
            Self::OutOfTimeWindow => "out of time window",
            Self::IntegrationFailed => "integration failed",
        };
        f.write_str(s)
    }
}

/// One physical tracer particle at a point in time.
///
/// The record is plain data: it is created by seed distribution, mutated
/// by the (external) integrator, handed between processes by the migration
/// machinery, and read back by the driver for output assembly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecord {
    /// Spatial coordinates plus the integration-time coordinate
    /// (`position[3]`). The time coordinate must lie within the cached
    /// `[t0, t1]` window, tolerance `(t1 - t0) / 100`.
    pub position: [f64; 4],
    /// Output-point id within the local active set; `-1` means unassigned.
    /// Reset on arrival so the receiving process re-resolves it.
    pub point_id: i64,
    /// Opaque hint used by the owning subdomain's spatial search to resume
    /// cell location efficiently.
    pub location_state: i32,
    /// Last-known containing cells at the two bracketing time steps.
    pub cached_cell_id: [CellId; 2],
    /// Dataset blocks holding the cached cells.
    pub cached_dataset_id: [DataSetId; 2],
    /// Which injection source produced this particle.
    pub source_id: SourceId,
    /// Index of the seed point within its injection source.
    pub injected_point_id: i64,
    /// Reinjection event that produced this particle.
    pub injected_step_id: i32,
    /// Number of integration steps taken.
    pub time_step_age: i32,
    /// Globally unique identifier; [`ParticleId::UNASSIGNED`] until a block
    /// is reserved. Assigned exactly once, never reused.
    pub unique_id: ParticleId,
    /// Accumulated rotation, for rotating-frame traces.
    pub rotation: f64,
    /// Local angular velocity.
    pub angular_vel: f64,
    /// Time the particle has been alive.
    pub age: f64,
    /// Speed at the last evaluated position.
    pub speed: f64,
    /// Simulation time of the last update.
    pub time: f64,
    /// Outcome of the last integration attempt.
    pub status: ParticleStatus,
}

impl ParticleRecord {
    /// Build a seed candidate: a particle at `position` stamped with the
    /// injection time and provenance, ids unassigned, scalars zeroed.
    ///
    /// Every process builds the identical full candidate list for an
    /// injection event; ownership testing then decides which candidates
    /// each process keeps.
    pub fn seed_candidate(
        position: [f64; 3],
        time: f64,
        source_id: SourceId,
        injected_point_id: i64,
        injected_step_id: i32,
    ) -> Self {
        Self {
            position: [position[0], position[1], position[2], time],
            point_id: -1,
            location_state: 0,
            cached_cell_id: [CellId::NONE, CellId::NONE],
            cached_dataset_id: [DataSetId(0), DataSetId(0)],
            source_id,
            injected_point_id,
            injected_step_id,
            time_step_age: 0,
            unique_id: ParticleId::UNASSIGNED,
            rotation: 0.0,
            angular_vel: 0.0,
            age: 0.0,
            speed: 0.0,
            time: 0.0,
            status: ParticleStatus::Ok,
        }
    }

    /// The spatial part of the position.
    pub fn coords(&self) -> [f64; 3] {
        [self.position[0], self.position[1], self.position[2]]
    }

    /// The integration-time coordinate (`position[3]`).
    pub fn time_coord(&self) -> f64 {
        self.position[3]
    }
}
