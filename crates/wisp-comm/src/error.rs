//! Error types for collective communication.

use std::error::Error;
use std::fmt;

/// Errors from collective operations.
///
/// Any of these is fatal for the current exchange round: the group's
/// members are no longer in agreement about what is being exchanged, and
/// continuing would deadlock or corrupt the protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A root rank argument was outside `0..size`.
    RankOutOfRange {
        /// The offending rank.
        rank: usize,
        /// Size of the group.
        size: usize,
    },
    /// `recv_lengths` did not have one entry per rank.
    LengthsArityMismatch {
        /// Expected entry count (group size).
        expected: usize,
        /// Entries supplied.
        found: usize,
    },
    /// The local send buffer's length disagrees with the declared length
    /// for this rank.
    SendLengthMismatch {
        /// Length declared in `recv_lengths[rank]`.
        declared: usize,
        /// Actual send buffer length.
        actual: usize,
    },
    /// A peer's contribution did not match its declared length.
    RecvLengthMismatch {
        /// The peer rank.
        rank: usize,
        /// Length declared for that rank.
        declared: usize,
        /// Length actually received.
        actual: usize,
    },
    /// Members called different collectives, or the same collective out
    /// of order. The group cannot recover.
    CollectiveMismatch {
        /// Operation this member is executing.
        local: &'static str,
        /// Operation the peer's message belongs to.
        remote: &'static str,
        /// The peer rank.
        rank: usize,
    },
    /// A member dropped out of the group mid-collective.
    GroupDisconnected {
        /// The peer rank whose link went down.
        rank: usize,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankOutOfRange { rank, size } => {
                write!(f, "rank {rank} out of range for group of {size}")
            }
            Self::LengthsArityMismatch { expected, found } => {
                write!(f, "recv_lengths has {found} entries, expected {expected}")
            }
            Self::SendLengthMismatch { declared, actual } => {
                write!(
                    f,
                    "send buffer is {actual} bytes, {declared} declared for this rank"
                )
            }
            Self::RecvLengthMismatch {
                rank,
                declared,
                actual,
            } => {
                write!(
                    f,
                    "rank {rank} contributed {actual} bytes, {declared} declared"
                )
            }
            Self::CollectiveMismatch {
                local,
                remote,
                rank,
            } => {
                write!(
                    f,
                    "collective mismatch: executing {local}, rank {rank} sent {remote}"
                )
            }
            Self::GroupDisconnected { rank } => {
                write!(f, "group member {rank} disconnected mid-collective")
            }
        }
    }
}

impl Error for CommError {}
