//! Wisp: distributed particle migration for streamline and pathline
//! tracing.
//!
//! When a dataset is partitioned among cooperating processes, a tracer
//! particle integrated on one process eventually exits that process's
//! subdomain and must be handed to whichever process owns the region it
//! entered. Wisp implements that hand-off: seed distribution,
//! globally-consistent id allocation, a fixed-stride wire encoding for
//! per-particle attribute data, and the collective all-to-all exchange
//! that moves particles between all processes without losing or
//! duplicating any.
//!
//! This is the top-level facade crate re-exporting the public API from
//! all Wisp sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use wisp::prelude::*;
//!
//! // The dataset layer supplies ownership, integration, and sampling.
//! // Here: a unit-cube subdomain, straight-line advection, no attributes.
//! struct UnitCube;
//! impl OwnershipTester for UnitCube {
//!     fn contains(&self, p: &[f64; 3], _t: f64) -> bool {
//!         p.iter().all(|&c| (0.0..1.0).contains(&c))
//!     }
//!     fn locate_and_cache(&self, p: &[f64; 3], t: f64, hint: i32) -> Option<CellLocation> {
//!         self.contains(p, t).then_some(CellLocation {
//!             cell_id: wisp::types::CellId(0),
//!             dataset_id: wisp::types::DataSetId(0),
//!             location_state: hint + 1,
//!         })
//!     }
//! }
//!
//! struct Drift;
//! impl Integrator for Drift {
//!     fn advance(&mut self, record: &mut ParticleRecord) -> AdvanceOutcome {
//!         record.position[0] += 0.05;
//!         record.position[3] += 0.05;
//!         AdvanceOutcome::ok()
//!     }
//! }
//!
//! struct NoAttributes;
//! impl AttributeSampler for NoAttributes {
//!     fn sample(&self, _p: &[f64; 3], _t: f64) -> AttributeSnapshot {
//!         AttributeSnapshot::default()
//!     }
//! }
//!
//! // Single-process configuration: the coordinator degenerates to a
//! // one-member group, same algorithm, no communication.
//! let config = TracerConfig {
//!     schema: AttributeSchema::new(),
//!     processes: 1,
//! };
//! let mut coordinator = MigrationCoordinator::new(config, None).unwrap();
//! coordinator.set_time_window(0.0, 1.0);
//!
//! let report = coordinator
//!     .inject(&[[0.5, 0.5, 0.5]], 0.0, wisp::types::SourceId(0), 0, &UnitCube)
//!     .unwrap();
//! assert_eq!(report.local_assigned, 1);
//!
//! let report = coordinator
//!     .step(&mut Drift, &UnitCube, &NoAttributes)
//!     .unwrap();
//! assert_eq!(report.advected, 1);
//! assert_eq!(coordinator.active().len(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wisp-core` | Particle records, ids, attribute schema, consumed traits |
//! | [`comm`] | `wisp-comm` | Communicator trait, single-process and in-process groups |
//! | [`wire`] | `wisp-wire` | Binary migration codec |
//! | [`engine`] | `wisp-engine` | Id allocation, seeding, exchange, coordinator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, ids, and consumed traits (`wisp-core`).
///
/// Contains [`types::ParticleRecord`], the attribute schema/snapshot
/// pair, and the [`types::OwnershipTester`], [`types::Integrator`], and
/// [`types::AttributeSampler`] seams to the dataset layer.
pub use wisp_core as types;

/// Collective communication groups (`wisp-comm`).
///
/// The [`comm::Communicator`] trait plus [`comm::SingleProcess`] and the
/// in-process [`comm::ThreadedGroup`].
pub use wisp_comm as comm;

/// Binary migration codec (`wisp-wire`).
///
/// Fixed-stride little-endian encode/decode of migration items:
/// [`wire::encode_items`], [`wire::decode_items`], [`wire::item_stride`].
pub use wisp_wire as wire;

/// Migration engine (`wisp-engine`).
///
/// [`engine::MigrationCoordinator`] orchestrates the per-step cycle;
/// [`engine::UniqueIdAllocator`] and [`engine::SeedDistributor`] handle
/// id blocks and injection events.
pub use wisp_engine as engine;

/// Common imports for typical Wisp usage.
///
/// ```rust
/// use wisp::prelude::*;
/// ```
pub mod prelude {
    // Core data model and consumed traits
    pub use wisp_core::{
        AdvanceOutcome, AttributeSampler, AttributeSchema, AttributeSnapshot, CellLocation,
        Integrator, MigrationItem, OwnershipTester, ParticleId, ParticleRecord, ParticleStatus,
    };

    // Errors
    pub use wisp_comm::CommError;
    pub use wisp_core::SchemaError;
    pub use wisp_engine::{ConfigError, MigrationError};
    pub use wisp_wire::WireError;

    // Communication groups
    pub use wisp_comm::{Communicator, SingleProcess, ThreadedGroup};

    // Engine
    pub use wisp_engine::{
        InjectReport, MigrationCoordinator, Phase, StepReport, TracerConfig, UniqueIdAllocator,
    };
}
