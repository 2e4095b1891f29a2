//! Test utilities and mock collaborators for Wisp development.
//!
//! Provides mock implementations of the consumed dataset-layer traits:
//!
//! - [`BoxOwnership`] — axis-aligned half-open box subdomains.
//! - [`ConstVelocityIntegrator`] — straight-line advection at a fixed
//!   velocity.
//! - [`RandomWalkIntegrator`] — seeded random-walk advection for stress
//!   scenarios.
//! - [`ConstSampler`] — schema-shaped snapshots filled with a constant.
//!
//! Plus small schema fixtures shared across the workspace's tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

use wisp_core::{
    AdvanceOutcome, AttributeSampler, AttributeSchema, AttributeSnapshot, CellId, CellLocation,
    DataSetId, Integrator, OwnershipTester, ParticleRecord, ParticleStatus,
};

/// The schema most workspace tests share: a 3-component velocity array
/// followed by a 1-component temperature array.
pub fn velocity_temperature_schema() -> AttributeSchema {
    let mut schema = AttributeSchema::new();
    schema
        .push_array("velocity", 3)
        .expect("fresh schema accepts velocity");
    schema
        .push_array("temperature", 1)
        .expect("fresh schema accepts temperature");
    schema
}

/// Ownership tester for an axis-aligned box subdomain.
///
/// Containment is half-open, `[min, max)` on every axis, so a point on a
/// face shared by two adjacent boxes belongs to exactly one of them —
/// the deterministic tie-break for rank-ordered partitions.
#[derive(Clone, Copy, Debug)]
pub struct BoxOwnership {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoxOwnership {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Unit cube at `x ∈ [rank, rank + 1)` — the standard partition for
    /// rank-indexed multi-member tests.
    pub fn unit_cube_at(rank: usize) -> Self {
        let r = rank as f64;
        Self {
            min: [r, 0.0, 0.0],
            max: [r + 1.0, 1.0, 1.0],
        }
    }

    /// Flat octant index of a contained point, used as a fake cell id.
    fn octant(&self, position: &[f64; 3]) -> i64 {
        let mut index = 0i64;
        for axis in 0..3 {
            let mid = (self.min[axis] + self.max[axis]) / 2.0;
            if position[axis] >= mid {
                index |= 1 << axis;
            }
        }
        index
    }
}

impl OwnershipTester for BoxOwnership {
    fn contains(&self, position: &[f64; 3], _time: f64) -> bool {
        (0..3).all(|axis| position[axis] >= self.min[axis] && position[axis] < self.max[axis])
    }

    fn locate_and_cache(
        &self,
        position: &[f64; 3],
        time: f64,
        hint: i32,
    ) -> Option<CellLocation> {
        if !self.contains(position, time) {
            return None;
        }
        Some(CellLocation {
            cell_id: CellId(self.octant(position)),
            dataset_id: DataSetId(0),
            location_state: hint + 1,
        })
    }
}

/// Straight-line advection at a fixed velocity.
///
/// Each step moves the particle by `velocity * dt`, advances the time
/// coordinate by `dt`, and updates the integrator-owned scalars. With
/// `bounds` set, a step that exits the overall bounds reports
/// `exited_domain` with [`ParticleStatus::OutOfDomain`].
#[derive(Clone, Copy, Debug)]
pub struct ConstVelocityIntegrator {
    pub velocity: [f64; 3],
    pub dt: f64,
    pub bounds: Option<([f64; 3], [f64; 3])>,
}

impl ConstVelocityIntegrator {
    pub fn new(velocity: [f64; 3], dt: f64) -> Self {
        Self {
            velocity,
            dt,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.bounds = Some((min, max));
        self
    }
}

impl Integrator for ConstVelocityIntegrator {
    fn advance(&mut self, record: &mut ParticleRecord) -> AdvanceOutcome {
        for axis in 0..3 {
            record.position[axis] += self.velocity[axis] * self.dt;
        }
        record.position[3] += self.dt;
        record.time = record.position[3];
        record.age += self.dt;
        record.speed = self
            .velocity
            .iter()
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt();

        if let Some((min, max)) = self.bounds {
            let inside = (0..3)
                .all(|axis| record.position[axis] >= min[axis] && record.position[axis] < max[axis]);
            if !inside {
                return AdvanceOutcome {
                    exited_domain: true,
                    status: ParticleStatus::OutOfDomain,
                };
            }
        }
        AdvanceOutcome::ok()
    }
}

/// Seeded random-walk advection for stress scenarios.
///
/// Deterministic for a given seed, so multi-member stress tests can
/// reproduce failures.
#[derive(Clone, Debug)]
pub struct RandomWalkIntegrator {
    rng: ChaCha8Rng,
    pub step: f64,
    pub dt: f64,
}

impl RandomWalkIntegrator {
    pub fn new(seed: u64, step: f64, dt: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            step,
            dt,
        }
    }
}

impl Integrator for RandomWalkIntegrator {
    fn advance(&mut self, record: &mut ParticleRecord) -> AdvanceOutcome {
        for axis in 0..3 {
            let delta: f64 = self.rng.random_range(-1.0..1.0);
            record.position[axis] += delta * self.step;
        }
        record.position[3] += self.dt;
        record.time = record.position[3];
        record.age += self.dt;
        AdvanceOutcome::ok()
    }
}

/// Sampler returning schema-shaped snapshots with every component set to
/// a constant.
#[derive(Clone, Debug)]
pub struct ConstSampler {
    schema: AttributeSchema,
    pub value: f64,
}

impl ConstSampler {
    pub fn new(schema: AttributeSchema, value: f64) -> Self {
        Self { schema, value }
    }
}

impl AttributeSampler for ConstSampler {
    fn sample(&self, _position: &[f64; 3], _time: f64) -> AttributeSnapshot {
        AttributeSnapshot {
            tuples: self
                .schema
                .iter()
                .map(|(_, components)| smallvec![self.value; components as usize])
                .collect(),
        }
    }
}
