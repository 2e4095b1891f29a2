//! In-process multi-member groups, one member per thread.
//!
//! [`ThreadedGroup::create`] builds a full mesh of channels between `n`
//! members. Each member is moved onto its own thread and used as a
//! [`Communicator`]; a collective completes only once contributions from
//! every peer have arrived, so each call is a synchronization point even
//! though the underlying channels are buffered.
//!
//! Every envelope carries the operation kind and a per-member sequence
//! number. Members that call different collectives (the deadlock
//! condition of a real MPI group) are detected and surfaced as
//! [`CommError::CollectiveMismatch`] instead of hanging; a member that
//! drops mid-collective surfaces as [`CommError::GroupDisconnected`].

use std::cell::Cell;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::CommError;
use crate::{Communicator, ReduceOp};

#[derive(Clone, Debug)]
enum Payload {
    U64(u64),
    Bytes(Vec<u8>),
    Unit,
}

#[derive(Clone, Debug)]
struct Envelope {
    seq: u64,
    op: &'static str,
    payload: Payload,
}

/// Factory for in-process communication groups.
pub struct ThreadedGroup;

impl ThreadedGroup {
    /// Create a group of `size` members connected by a full channel mesh.
    ///
    /// The returned members are indexed by rank. Each is `Send` and is
    /// meant to be moved onto its own thread; all members must make the
    /// same sequence of collective calls.
    pub fn create(size: usize) -> Vec<GroupMember> {
        // mesh[i][j]: sender for the i -> j link, paired with j's receiver.
        let mut senders: Vec<Vec<Option<Sender<Envelope>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        let mut receivers: Vec<Vec<Option<Receiver<Envelope>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();

        for from in 0..size {
            for to in 0..size {
                if from == to {
                    continue;
                }
                let (tx, rx) = unbounded();
                senders[from][to] = Some(tx);
                receivers[to][from] = Some(rx);
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (tx, rx))| GroupMember {
                rank,
                size,
                senders: tx,
                receivers: rx,
                seq: Cell::new(0),
            })
            .collect()
    }
}

/// One member of a [`ThreadedGroup`].
///
/// `Send` but not `Sync`: a member belongs to exactly one thread, matching
/// the one-control-flow-per-process model of the migration protocol.
pub struct GroupMember {
    rank: usize,
    size: usize,
    senders: Vec<Option<Sender<Envelope>>>,
    receivers: Vec<Option<Receiver<Envelope>>>,
    seq: Cell<u64>,
}

impl GroupMember {
    fn next_seq(&self) -> u64 {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        seq
    }

    fn send_to(&self, rank: usize, env: Envelope) -> Result<(), CommError> {
        let sender = self.senders[rank]
            .as_ref()
            .ok_or(CommError::GroupDisconnected { rank })?;
        sender
            .send(env)
            .map_err(|_| CommError::GroupDisconnected { rank })
    }

    fn recv_from(&self, rank: usize, seq: u64, op: &'static str) -> Result<Payload, CommError> {
        let receiver = self.receivers[rank]
            .as_ref()
            .ok_or(CommError::GroupDisconnected { rank })?;
        let env = receiver
            .recv()
            .map_err(|_| CommError::GroupDisconnected { rank })?;
        if env.op != op || env.seq != seq {
            return Err(CommError::CollectiveMismatch {
                local: op,
                remote: env.op,
                rank,
            });
        }
        Ok(env.payload)
    }

    fn check_root(&self, root: usize) -> Result<(), CommError> {
        if root >= self.size {
            return Err(CommError::RankOutOfRange {
                rank: root,
                size: self.size,
            });
        }
        Ok(())
    }
}

impl Communicator for GroupMember {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn broadcast_u64(&self, value: u64, root: usize) -> Result<u64, CommError> {
        self.check_root(root)?;
        let seq = self.next_seq();
        if self.rank == root {
            for peer in 0..self.size {
                if peer == self.rank {
                    continue;
                }
                self.send_to(
                    peer,
                    Envelope {
                        seq,
                        op: "broadcast",
                        payload: Payload::U64(value),
                    },
                )?;
            }
            Ok(value)
        } else {
            match self.recv_from(root, seq, "broadcast")? {
                Payload::U64(v) => Ok(v),
                _ => Err(CommError::CollectiveMismatch {
                    local: "broadcast",
                    remote: "malformed payload",
                    rank: root,
                }),
            }
        }
    }

    fn all_gather_u64(&self, value: u64) -> Result<Vec<u64>, CommError> {
        let seq = self.next_seq();
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            self.send_to(
                peer,
                Envelope {
                    seq,
                    op: "all_gather",
                    payload: Payload::U64(value),
                },
            )?;
        }
        let mut gathered = vec![0u64; self.size];
        gathered[self.rank] = value;
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            match self.recv_from(peer, seq, "all_gather")? {
                Payload::U64(v) => gathered[peer] = v,
                _ => {
                    return Err(CommError::CollectiveMismatch {
                        local: "all_gather",
                        remote: "malformed payload",
                        rank: peer,
                    })
                }
            }
        }
        Ok(gathered)
    }

    fn all_gather_v(&self, send: &[u8], recv_lengths: &[usize]) -> Result<Vec<u8>, CommError> {
        if recv_lengths.len() != self.size {
            return Err(CommError::LengthsArityMismatch {
                expected: self.size,
                found: recv_lengths.len(),
            });
        }
        if recv_lengths[self.rank] != send.len() {
            return Err(CommError::SendLengthMismatch {
                declared: recv_lengths[self.rank],
                actual: send.len(),
            });
        }
        let seq = self.next_seq();
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            self.send_to(
                peer,
                Envelope {
                    seq,
                    op: "all_gather_v",
                    payload: Payload::Bytes(send.to_vec()),
                },
            )?;
        }
        let mut contributions: Vec<Option<Vec<u8>>> = (0..self.size).map(|_| None).collect();
        contributions[self.rank] = Some(send.to_vec());
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            match self.recv_from(peer, seq, "all_gather_v")? {
                Payload::Bytes(bytes) => {
                    if bytes.len() != recv_lengths[peer] {
                        return Err(CommError::RecvLengthMismatch {
                            rank: peer,
                            declared: recv_lengths[peer],
                            actual: bytes.len(),
                        });
                    }
                    contributions[peer] = Some(bytes);
                }
                _ => {
                    return Err(CommError::CollectiveMismatch {
                        local: "all_gather_v",
                        remote: "malformed payload",
                        rank: peer,
                    })
                }
            }
        }
        let total: usize = recv_lengths.iter().sum();
        let mut buffer = Vec::with_capacity(total);
        for contribution in contributions.into_iter().flatten() {
            buffer.extend_from_slice(&contribution);
        }
        Ok(buffer)
    }

    fn reduce_u64(
        &self,
        value: u64,
        op: ReduceOp,
        root: usize,
    ) -> Result<Option<u64>, CommError> {
        self.check_root(root)?;
        let seq = self.next_seq();
        if self.rank == root {
            let mut acc = value;
            for peer in 0..self.size {
                if peer == self.rank {
                    continue;
                }
                match self.recv_from(peer, seq, "reduce")? {
                    Payload::U64(v) => acc = op.combine(acc, v),
                    _ => {
                        return Err(CommError::CollectiveMismatch {
                            local: "reduce",
                            remote: "malformed payload",
                            rank: peer,
                        })
                    }
                }
            }
            Ok(Some(acc))
        } else {
            self.send_to(
                root,
                Envelope {
                    seq,
                    op: "reduce",
                    payload: Payload::U64(value),
                },
            )?;
            Ok(None)
        }
    }

    fn barrier(&self) -> Result<(), CommError> {
        let seq = self.next_seq();
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            self.send_to(
                peer,
                Envelope {
                    seq,
                    op: "barrier",
                    payload: Payload::Unit,
                },
            )?;
        }
        for peer in 0..self.size {
            if peer == self.rank {
                continue;
            }
            self.recv_from(peer, seq, "barrier")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GroupMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupMember")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}
