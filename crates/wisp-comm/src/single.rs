//! The trivial one-member communication group.

use crate::error::CommError;
use crate::{Communicator, ReduceOp};

/// A group of one: every collective degenerates to the identity.
///
/// Lets migration code written against [`Communicator`] run unchanged in a
/// single-process configuration — the one-member group replaces the
/// duplicated "no controller" branches the protocol would otherwise need.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn broadcast_u64(&self, value: u64, root: usize) -> Result<u64, CommError> {
        if root != 0 {
            return Err(CommError::RankOutOfRange { rank: root, size: 1 });
        }
        Ok(value)
    }

    fn all_gather_u64(&self, value: u64) -> Result<Vec<u64>, CommError> {
        Ok(vec![value])
    }

    fn all_gather_v(&self, send: &[u8], recv_lengths: &[usize]) -> Result<Vec<u8>, CommError> {
        if recv_lengths.len() != 1 {
            return Err(CommError::LengthsArityMismatch {
                expected: 1,
                found: recv_lengths.len(),
            });
        }
        if recv_lengths[0] != send.len() {
            return Err(CommError::SendLengthMismatch {
                declared: recv_lengths[0],
                actual: send.len(),
            });
        }
        Ok(send.to_vec())
    }

    fn reduce_u64(
        &self,
        value: u64,
        _op: ReduceOp,
        root: usize,
    ) -> Result<Option<u64>, CommError> {
        if root != 0 {
            return Err(CommError::RankOutOfRange { rank: root, size: 1 });
        }
        Ok(Some(value))
    }

    fn barrier(&self) -> Result<(), CommError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collectives_are_identity() {
        let comm = SingleProcess;
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
        assert_eq!(comm.broadcast_u64(7, 0).unwrap(), 7);
        assert_eq!(comm.all_gather_u64(9).unwrap(), vec![9]);
        assert_eq!(
            comm.all_gather_v(b"abc", &[3]).unwrap(),
            b"abc".to_vec()
        );
        assert_eq!(comm.reduce_u64(5, ReduceOp::Sum, 0).unwrap(), Some(5));
        comm.barrier().unwrap();
    }

    #[test]
    fn bad_root_rejected() {
        let comm = SingleProcess;
        assert!(matches!(
            comm.broadcast_u64(0, 1),
            Err(CommError::RankOutOfRange { rank: 1, size: 1 })
        ));
    }

    #[test]
    fn send_length_must_match_declaration() {
        let comm = SingleProcess;
        assert!(matches!(
            comm.all_gather_v(b"abc", &[2]),
            Err(CommError::SendLengthMismatch {
                declared: 2,
                actual: 3
            })
        ));
    }
}
