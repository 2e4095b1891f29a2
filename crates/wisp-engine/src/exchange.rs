//! The collective migration exchange.
//!
//! Destination ownership is unknown until the *receiving* process runs
//! its ownership test, so migration broadcasts every process's outbound
//! items to every process and lets each receiver filter. The caller's
//! own contribution comes back in the gathered buffer and is removed
//! afterwards by offset — sending it and discarding it is what keeps the
//! collective shapes identical on every member. Bandwidth is
//! O(members × total outbound) instead of O(total outbound); boundary
//! crossings per step are expected to be a small fraction of the particle
//! population, which is the trade-off that makes this acceptable.

use wisp_comm::Communicator;
use wisp_core::{AttributeSchema, MigrationItem};
use wisp_wire::{decode_items, encode_items, item_stride};

use crate::error::MigrationError;

const FAULT_NONE: u64 = 0;
const FAULT_ENCODE: u64 = 1;

/// Exchange outbound items with every other group member.
///
/// Returns the union of all members' outbound items except the caller's
/// own. Consumes the outbound queue — after the call the caller holds no
/// reference to the sent items, which is what makes re-absorption
/// impossible by construction.
///
/// Every member must call this each round, including members with nothing
/// to send (they contribute an empty segment).
///
/// # Errors
///
/// A local encode fault returns [`MigrationError::Wire`]; the same round,
/// every other member returns [`MigrationError::RemoteFault`] naming the
/// faulting rank. The fault flag is gathered *before* the payload
/// exchange so that no member is left waiting in a collective the others
/// abandoned.
pub fn exchange_all(
    outbound: Vec<MigrationItem>,
    schema: &AttributeSchema,
    comm: &dyn Communicator,
) -> Result<Vec<MigrationItem>, MigrationError> {
    let stride = item_stride(schema);

    // Encode before the first collective so schema faults can be
    // announced to the group instead of deadlocking it.
    let encoded = encode_items(&outbound, schema);
    let fault = if encoded.is_ok() { FAULT_NONE } else { FAULT_ENCODE };
    let faults = comm.all_gather_u64(fault)?;
    if faults.iter().any(|&f| f != FAULT_NONE) {
        return match encoded {
            Err(e) => Err(MigrationError::Wire(e)),
            Ok(_) => {
                let rank = faults
                    .iter()
                    .position(|&f| f != FAULT_NONE)
                    .unwrap_or(0);
                Err(MigrationError::RemoteFault { rank })
            }
        };
    }
    let send = match encoded {
        Ok(bytes) => bytes,
        Err(e) => return Err(MigrationError::Wire(e)),
    };

    // Announce counts, derive every member's byte length and offset.
    let counts = comm.all_gather_u64(outbound.len() as u64)?;
    let lengths: Vec<usize> = counts.iter().map(|&c| c as usize * stride).collect();
    let own_item_offset: usize = counts[..comm.rank()].iter().map(|&c| c as usize).sum();

    let buffer = comm.all_gather_v(&send, &lengths)?;
    let mut inbound = decode_items(&buffer, schema)?;

    // Drop our own contiguous slice — these are the items we just sent.
    inbound.drain(own_item_offset..own_item_offset + outbound.len());
    Ok(inbound)
}
