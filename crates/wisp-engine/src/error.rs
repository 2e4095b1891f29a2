//! Error types for the migration engine.

use std::error::Error;
use std::fmt;

use wisp_comm::CommError;
use wisp_wire::WireError;

/// Errors from an id allocation, seed distribution, or exchange round.
///
/// All of these abort the current round for the whole group: the
/// fault-flag gather in [`exchange_all`](crate::exchange::exchange_all)
/// guarantees every member observes the abort instead of stalling in a
/// later collective.
#[derive(Debug)]
pub enum MigrationError {
    /// A collective operation failed.
    Comm(CommError),
    /// Encoding or decoding a migration buffer failed locally.
    Wire(WireError),
    /// Another group member reported a fatal encode fault; the round was
    /// abandoned before the payload exchange.
    RemoteFault {
        /// Rank of the faulting member.
        rank: usize,
    },
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comm(e) => write!(f, "collective operation failed: {e}"),
            Self::Wire(e) => write!(f, "migration codec failed: {e}"),
            Self::RemoteFault { rank } => {
                write!(f, "rank {rank} reported a fatal fault; round abandoned")
            }
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            Self::Wire(e) => Some(e),
            Self::RemoteFault { .. } => None,
        }
    }
}

impl From<CommError> for MigrationError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<WireError> for MigrationError {
    fn from(e: WireError) -> Self {
        Self::Wire(e)
    }
}
