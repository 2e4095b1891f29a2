//! The per-process migration coordinator.
//!
//! One coordinator runs on each process and owns that process's active
//! particle set and outbound queue outright — no other component touches
//! them. Each integration step runs one cycle of the state machine:
//!
//! ```text
//! Idle → LocalAdvance → Migrating → Reconciling → Idle
//! ```
//!
//! `LocalAdvance` advances every locally-owned particle and queues the
//! ones that left the subdomain; `Migrating` runs the collective
//! exchange; `Reconciling` classifies the arrivals against local
//! ownership, splicing accepted particles into the active set and
//! setting the rest aside as rejected.

use wisp_comm::{Communicator, SingleProcess};
use wisp_core::{
    AttributeSampler, AttributeSchema, Integrator, MigrationItem, OwnershipTester, ParticleId,
    ParticleRecord, ParticleStatus, SourceId,
};

use crate::config::{ConfigError, TracerConfig};
use crate::error::MigrationError;
use crate::exchange::exchange_all;
use crate::ids::UniqueIdAllocator;
use crate::report::{InjectReport, StepReport};
use crate::seed::SeedDistributor;

/// Amount added to a migrated particle's unique id when it settles on a
/// new owner.
///
/// Distinguishes a particle re-entering a domain it previously left from
/// the history it recorded there under the old id. A per-particle
/// generation counter would express this more directly; the offset is
/// kept because downstream output assembly keys on it (see DESIGN.md).
const RESETTLE_ID_STEP: i64 = 1;

/// Where the coordinator is in its per-step cycle.
///
/// Outside [`step()`](MigrationCoordinator::step) the coordinator is
/// always `Idle`; the other states are observable from the ownership,
/// integration, and sampling callbacks invoked during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Between steps.
    #[default]
    Idle,
    /// Advancing locally-owned particles, queueing subdomain leavers.
    LocalAdvance,
    /// Inside the collective exchange.
    Migrating,
    /// Classifying arrivals against local ownership.
    Reconciling,
}

/// Orchestrates one process's share of the distributed migration
/// protocol.
pub struct MigrationCoordinator {
    comm: Box<dyn Communicator>,
    schema: AttributeSchema,
    ids: UniqueIdAllocator,
    seeder: SeedDistributor,
    active: Vec<ParticleRecord>,
    outbound: Vec<MigrationItem>,
    arrivals: Vec<MigrationItem>,
    rejected: Vec<ParticleRecord>,
    time_window: (f64, f64),
    phase: Phase,
}

impl MigrationCoordinator {
    /// Build a coordinator from a validated configuration.
    ///
    /// `comm` is the process's communication group. `None` is accepted
    /// only for a single-process configuration, which degenerates to the
    /// trivial one-member group; a multi-process configuration without a
    /// substrate is a fatal configuration error — there is no safe
    /// local-counter fallback.
    pub fn new(
        config: TracerConfig,
        comm: Option<Box<dyn Communicator>>,
    ) -> Result<Self, ConfigError> {
        if config.processes == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        let comm: Box<dyn Communicator> = match comm {
            Some(comm) => {
                if comm.size() != config.processes {
                    return Err(ConfigError::GroupSizeMismatch {
                        declared: config.processes,
                        actual: comm.size(),
                    });
                }
                comm
            }
            None if config.processes == 1 => Box::new(SingleProcess),
            None => {
                return Err(ConfigError::CommunicatorRequired {
                    processes: config.processes,
                })
            }
        };
        Ok(Self {
            comm,
            schema: config.schema,
            ids: UniqueIdAllocator::new(),
            seeder: SeedDistributor::new(),
            active: Vec::new(),
            outbound: Vec::new(),
            arrivals: Vec::new(),
            rejected: Vec::new(),
            time_window: (0.0, 0.0),
            phase: Phase::Idle,
        })
    }

    /// This process's rank within the group.
    pub fn rank(&self) -> usize {
        self.comm.rank()
    }

    /// Number of processes in the group.
    pub fn size(&self) -> usize {
        self.comm.size()
    }

    /// Current position in the per-step cycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The run's prototype attribute schema.
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// The locally-owned particles.
    pub fn active(&self) -> &[ParticleRecord] {
        &self.active
    }

    /// Migration items absorbed during the most recent step, with their
    /// previous states and attribute snapshots. The dataset layer reads
    /// these to warm its interpolation caches for the new arrivals.
    pub fn arrivals(&self) -> &[MigrationItem] {
        &self.arrivals
    }

    /// Arrivals this process declined during reconciliation.
    ///
    /// An arrival declined by every process has exited the domain through
    /// an open boundary; it shows up in each non-origin process's
    /// rejected list and in no active set. The driver drains these for
    /// output assembly.
    pub fn rejected(&self) -> &[ParticleRecord] {
        &self.rejected
    }

    /// Drain the rejected-arrival records for output assembly.
    pub fn take_rejected(&mut self) -> Vec<ParticleRecord> {
        std::mem::take(&mut self.rejected)
    }

    /// Update the cached time bracket used for the migration-time sanity
    /// check. Tolerance is `(t1 - t0) / 100`.
    pub fn set_time_window(&mut self, t0: f64, t1: f64) {
        self.time_window = (t0, t1);
    }

    /// Inject one seed event: identical candidate list on every process,
    /// local ownership filtering, id assignment, splice into the active
    /// set. Collective — every process must call this together.
    pub fn inject(
        &mut self,
        seeds: &[[f64; 3]],
        time: f64,
        source_id: SourceId,
        base_point_id: i64,
        owner: &dyn OwnershipTester,
    ) -> Result<InjectReport, MigrationError> {
        let outcome = self.seeder.distribute(
            seeds,
            time,
            source_id,
            base_point_id,
            owner,
            &mut self.ids,
            &*self.comm,
        )?;
        let report = InjectReport {
            local_assigned: outcome.particles.len(),
            total_assigned: outcome.total_assigned,
            injected_step_id: outcome.injected_step_id,
        };
        self.active.extend(outcome.particles);
        Ok(report)
    }

    /// Run one full migration cycle.
    ///
    /// Collective: every process must call this once per global
    /// integration step, after which all active sets are consistent —
    /// no particle lost, none duplicated.
    pub fn step(
        &mut self,
        integrator: &mut dyn Integrator,
        owner: &dyn OwnershipTester,
        sampler: &dyn AttributeSampler,
    ) -> Result<StepReport, MigrationError> {
        let mut report = StepReport::default();

        // ── LocalAdvance ────────────────────────────────────────
        self.phase = Phase::LocalAdvance;
        self.outbound.clear();
        self.arrivals.clear();
        let (t0, t1) = self.time_window;
        let eps = (t1 - t0) / 100.0;

        let mut remaining = Vec::with_capacity(self.active.len());
        for mut particle in self.active.drain(..) {
            let previous = particle;
            let outcome = integrator.advance(&mut particle);
            particle.time_step_age += 1;
            particle.status = outcome.status;
            report.advected += 1;

            let left_subdomain = outcome.exited_domain
                || !owner.contains(&particle.coords(), particle.time_coord());
            if !left_subdomain {
                remaining.push(particle);
                continue;
            }

            let t = particle.time_coord();
            if t < t0 - eps || t > t1 + eps {
                particle.status = ParticleStatus::OutOfTimeWindow;
                report.time_window_violations += 1;
            }
            let previous_attributes = sampler.sample(&previous.coords(), previous.time_coord());
            self.outbound.push(MigrationItem {
                current: particle,
                previous,
                previous_attributes,
            });
            report.sent += 1;
        }
        self.active = remaining;

        // ── Migrating ───────────────────────────────────────────
        self.phase = Phase::Migrating;
        let outbound = std::mem::take(&mut self.outbound);
        let inbound = match exchange_all(outbound, &self.schema, &*self.comm) {
            Ok(items) => items,
            Err(e) => {
                self.phase = Phase::Idle;
                return Err(e);
            }
        };
        report.received = inbound.len();

        // ── Reconciling ─────────────────────────────────────────
        self.phase = Phase::Reconciling;
        for mut item in inbound {
            item.current.unique_id = ParticleId(item.current.unique_id.0 + RESETTLE_ID_STEP);
            item.previous.unique_id = ParticleId(item.previous.unique_id.0 + RESETTLE_ID_STEP);

            if owner.contains(&item.current.coords(), item.current.time_coord()) {
                item.current.point_id = -1;
                if let Some(location) = owner.locate_and_cache(
                    &item.current.coords(),
                    item.current.time_coord(),
                    item.current.location_state,
                ) {
                    item.current.location_state = location.location_state;
                    item.current.cached_cell_id[0] = location.cell_id;
                    item.current.cached_dataset_id[0] = location.dataset_id;
                }
                self.active.push(item.current);
                self.arrivals.push(item);
                report.absorbed += 1;
            } else {
                self.rejected.push(item.current);
                report.rejected += 1;
            }
        }

        self.phase = Phase::Idle;
        Ok(report)
    }

    /// Barrier ending one full pipeline execution.
    ///
    /// Downstream stages may gather results from all processes, so no
    /// process may begin the next external request until every process
    /// has finished migrating.
    pub fn finish_request(&mut self) -> Result<(), MigrationError> {
        self.comm.barrier()?;
        Ok(())
    }
}

impl std::fmt::Debug for MigrationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationCoordinator")
            .field("rank", &self.comm.rank())
            .field("size", &self.comm.size())
            .field("phase", &self.phase)
            .field("active", &self.active.len())
            .field("rejected", &self.rejected.len())
            .finish()
    }
}
