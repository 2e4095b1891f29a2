//! Tracer configuration and validation errors.

use std::error::Error;
use std::fmt;

use wisp_core::AttributeSchema;

/// Configuration for a [`MigrationCoordinator`](crate::MigrationCoordinator).
///
/// The schema is the run's fixed prototype: identical on every process
/// and immutable for the run's lifetime. `processes` declares how many
/// subdomain owners the run is partitioned across; the coordinator
/// validates it against the supplied communication group at construction.
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// The prototype attribute schema carried with every migrated particle.
    pub schema: AttributeSchema,
    /// Number of cooperating processes the dataset is partitioned across.
    pub processes: usize,
}

/// Errors detected while constructing a coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `processes` was zero.
    ZeroProcesses,
    /// A multi-process partition was declared but no communication
    /// substrate was supplied. Fatal: falling back to local counters
    /// would silently break global id uniqueness.
    CommunicatorRequired {
        /// The declared process count.
        processes: usize,
    },
    /// The supplied communication group has the wrong member count.
    GroupSizeMismatch {
        /// Process count declared in the configuration.
        declared: usize,
        /// Member count of the supplied group.
        actual: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroProcesses => write!(f, "process count must be at least 1"),
            Self::CommunicatorRequired { processes } => {
                write!(
                    f,
                    "{processes} processes declared but no communication substrate supplied"
                )
            }
            Self::GroupSizeMismatch { declared, actual } => {
                write!(
                    f,
                    "configuration declares {declared} processes, group has {actual} members"
                )
            }
        }
    }
}

impl Error for ConfigError {}
