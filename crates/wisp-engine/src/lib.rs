//! Migration engine orchestrating distributed particle hand-off for Wisp.
//!
//! One [`MigrationCoordinator`] runs per process. Each integration step it
//! advances the locally owned particles, collects the ones that left the
//! local subdomain, exchanges them with every other process through the
//! collective protocol, and reconciles the arrivals against local
//! ownership. Seed injection and globally-consistent id allocation live
//! here as well.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod exchange;
pub mod ids;
pub mod report;
pub mod seed;

pub use config::{ConfigError, TracerConfig};
pub use coordinator::{MigrationCoordinator, Phase};
pub use error::MigrationError;
pub use exchange::exchange_all;
pub use ids::{IdBlock, UniqueIdAllocator};
pub use report::{InjectReport, StepReport};
pub use seed::{SeedDistributor, SeedOutcome};
