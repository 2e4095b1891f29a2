//! Seed distribution: turning injection points into locally-owned
//! particles.
//!
//! Every process receives (or computes) the same full candidate list for
//! an injection event and tests the *entire* list against its own
//! ownership — no distributed point-location pre-pass. Exactly one
//! process keeps each seed (ownership is exclusive by the partitioning
//! contract), then id blocks sized to each local accepted count are
//! reserved and stamped in candidate order.

use wisp_comm::{Communicator, ReduceOp};
use wisp_core::{OwnershipTester, ParticleRecord, SourceId};

use crate::error::MigrationError;
use crate::ids::UniqueIdAllocator;

/// Locally accepted particles from one injection event.
#[derive(Clone, Debug, Default)]
pub struct SeedOutcome {
    /// The particles this process owns, ids assigned, in candidate order.
    pub particles: Vec<ParticleRecord>,
    /// Total accepted across the group; populated on rank 0 only.
    pub total_assigned: Option<u64>,
    /// Reinjection counter stamped on this event's candidates.
    pub injected_step_id: i32,
}

/// Converts injection points into locally-owned, id-stamped particles.
///
/// Holds the reinjection counter shared by all candidates of one event;
/// the counter increases monotonically across events.
#[derive(Clone, Debug, Default)]
pub struct SeedDistributor {
    reinjection_counter: i32,
}

impl SeedDistributor {
    /// Distributor starting at reinjection event 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next injection event will be stamped with.
    pub fn reinjection_counter(&self) -> i32 {
        self.reinjection_counter
    }

    /// Distribute one injection event.
    ///
    /// Collective: every group member must call this together with the
    /// identical seed list. `base_point_id` offsets `injected_point_id`
    /// so that successive sources number their seeds disjointly.
    pub fn distribute(
        &mut self,
        seeds: &[[f64; 3]],
        time: f64,
        source_id: SourceId,
        base_point_id: i64,
        owner: &dyn OwnershipTester,
        ids: &mut UniqueIdAllocator,
        comm: &dyn Communicator,
    ) -> Result<SeedOutcome, MigrationError> {
        let injected_step_id = self.reinjection_counter;
        self.reinjection_counter += 1;

        // Every rank builds the identical full candidate list, then tests
        // each candidate against its own subdomain.
        let mut particles = Vec::new();
        for (i, &point) in seeds.iter().enumerate() {
            let mut candidate = ParticleRecord::seed_candidate(
                point,
                time,
                source_id,
                base_point_id + i as i64,
                injected_step_id,
            );
            if !owner.contains(&point, time) {
                continue;
            }
            if let Some(location) = owner.locate_and_cache(&point, time, candidate.location_state)
            {
                candidate.location_state = location.location_state;
                candidate.cached_cell_id[0] = location.cell_id;
                candidate.cached_dataset_id[0] = location.dataset_id;
            }
            particles.push(candidate);
        }

        let total_assigned = comm.reduce_u64(particles.len() as u64, ReduceOp::Sum, 0)?;

        // Stamp ids over the accepted subset in candidate order.
        let block = ids.allocate(particles.len(), comm)?;
        for (particle, id) in particles.iter_mut().zip(block.iter()) {
            particle.unique_id = id;
        }

        Ok(SeedOutcome {
            particles,
            total_assigned,
            injected_step_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_comm::SingleProcess;
    use wisp_core::ParticleId;
    use wisp_test_utils::BoxOwnership;

    fn grid_seeds() -> Vec<[f64; 3]> {
        vec![
            [0.25, 0.5, 0.5],
            [0.75, 0.5, 0.5],
            [1.25, 0.5, 0.5],
            [1.75, 0.5, 0.5],
        ]
    }

    #[test]
    fn keeps_only_owned_candidates() {
        let owner = BoxOwnership::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut ids = UniqueIdAllocator::new();
        let mut seeder = SeedDistributor::new();

        let outcome = seeder
            .distribute(
                &grid_seeds(),
                0.0,
                SourceId(0),
                0,
                &owner,
                &mut ids,
                &SingleProcess,
            )
            .unwrap();

        assert_eq!(outcome.particles.len(), 2);
        assert_eq!(outcome.total_assigned, Some(2));
        assert_eq!(outcome.particles[0].injected_point_id, 0);
        assert_eq!(outcome.particles[1].injected_point_id, 1);
        assert_eq!(outcome.particles[0].unique_id, ParticleId(0));
        assert_eq!(outcome.particles[1].unique_id, ParticleId(1));
    }

    #[test]
    fn stamps_shared_step_id_and_advances_counter() {
        let owner = BoxOwnership::new([0.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let mut ids = UniqueIdAllocator::new();
        let mut seeder = SeedDistributor::new();

        let first = seeder
            .distribute(
                &grid_seeds(),
                0.0,
                SourceId(0),
                0,
                &owner,
                &mut ids,
                &SingleProcess,
            )
            .unwrap();
        let second = seeder
            .distribute(
                &grid_seeds(),
                1.0,
                SourceId(0),
                100,
                &owner,
                &mut ids,
                &SingleProcess,
            )
            .unwrap();

        assert_eq!(first.injected_step_id, 0);
        assert_eq!(second.injected_step_id, 1);
        assert!(first
            .particles
            .iter()
            .all(|p| p.injected_step_id == 0));
        assert!(second
            .particles
            .iter()
            .all(|p| p.injected_step_id == 1));
        // Second event's point ids carry the base offset.
        assert_eq!(second.particles[0].injected_point_id, 100);
    }

    #[test]
    fn accepted_seeds_carry_cache_hints() {
        let owner = BoxOwnership::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let mut ids = UniqueIdAllocator::new();
        let mut seeder = SeedDistributor::new();

        let outcome = seeder
            .distribute(
                &[[0.25, 0.5, 0.5]],
                0.0,
                SourceId(0),
                0,
                &owner,
                &mut ids,
                &SingleProcess,
            )
            .unwrap();

        let particle = &outcome.particles[0];
        assert!(particle.cached_cell_id[0].0 >= 0);
        assert!(particle.location_state > 0);
    }

    #[test]
    fn no_owned_seeds_yields_empty_outcome() {
        let owner = BoxOwnership::new([10.0, 10.0, 10.0], [11.0, 11.0, 11.0]);
        let mut ids = UniqueIdAllocator::new();
        let mut seeder = SeedDistributor::new();

        let outcome = seeder
            .distribute(
                &grid_seeds(),
                0.0,
                SourceId(0),
                0,
                &owner,
                &mut ids,
                &SingleProcess,
            )
            .unwrap();

        assert!(outcome.particles.is_empty());
        assert_eq!(outcome.total_assigned, Some(0));
        // No ids consumed for an empty block.
        assert_eq!(ids.next_id(), ParticleId(0));
    }
}
