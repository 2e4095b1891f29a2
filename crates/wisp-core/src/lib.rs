//! Core types and traits for the Wisp particle-migration framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! per-particle data model, the fixed attribute schema carried across
//! process boundaries, and the traits through which Wisp consumes the
//! surrounding dataset layer (ownership testing, integration, attribute
//! sampling).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attributes;
pub mod error;
pub mod id;
pub mod particle;
pub mod traits;

pub use attributes::{AttributeSchema, AttributeSnapshot, AttributeTuple, MigrationItem};
pub use error::SchemaError;
pub use id::{CellId, DataSetId, ParticleId, SourceId};
pub use particle::{ParticleRecord, ParticleStatus};
pub use traits::{AdvanceOutcome, AttributeSampler, CellLocation, Integrator, OwnershipTester};
