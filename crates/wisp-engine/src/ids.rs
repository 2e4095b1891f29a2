//! Globally-consistent unique id allocation.
//!
//! Every process keeps a replica of one logical global counter. An
//! allocation round broadcasts the authoritative value from rank 0,
//! all-gathers every rank's requested count, and carves rank-ordered
//! contiguous blocks out of the counter; each replica then advances by
//! the round's grand total, so all replicas agree without a second
//! broadcast. Block order matches rank order, which keeps id assignment
//! reproducible run-to-run.

use wisp_comm::Communicator;
use wisp_core::ParticleId;

use crate::error::MigrationError;

/// A contiguous block of reserved particle ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdBlock {
    /// First id in the block.
    pub first: ParticleId,
    /// Number of ids reserved.
    pub len: usize,
}

impl IdBlock {
    /// Iterate the reserved ids in order.
    pub fn iter(&self) -> impl Iterator<Item = ParticleId> + '_ {
        let first = self.first.0;
        (0..self.len as i64).map(move |i| ParticleId(first + i))
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Hands out globally-unique, process-independent particle ids.
#[derive(Clone, Debug, Default)]
pub struct UniqueIdAllocator {
    counter: i64,
}

impl UniqueIdAllocator {
    /// Allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator starting at an arbitrary counter value (resuming a run).
    pub fn starting_at(counter: i64) -> Self {
        Self { counter }
    }

    /// The next id this replica would hand out.
    pub fn next_id(&self) -> ParticleId {
        ParticleId(self.counter)
    }

    /// Reserve a contiguous block of `count` ids.
    ///
    /// Collective: every group member must call this together, each with
    /// its own `count` (possibly zero). Rank r's block starts at
    /// `counter + Σ counts[0..r]`. With a one-member group this is a
    /// plain local counter increment — no communication.
    pub fn allocate(
        &mut self,
        count: usize,
        comm: &dyn Communicator,
    ) -> Result<IdBlock, MigrationError> {
        if comm.size() == 1 {
            let first = ParticleId(self.counter);
            self.counter += count as i64;
            return Ok(IdBlock { first, len: count });
        }

        // Everyone adopts the authoritative counter before carving blocks.
        let counter = comm.broadcast_u64(self.counter as u64, 0)? as i64;
        let counts = comm.all_gather_u64(count as u64)?;
        let offset: i64 = counts[..comm.rank()].iter().map(|&c| c as i64).sum();
        let total: i64 = counts.iter().map(|&c| c as i64).sum();
        self.counter = counter + total;

        Ok(IdBlock {
            first: ParticleId(counter + offset),
            len: count,
        })
    }
}
