//! Binary migration codec for the Wisp particle-migration framework.
//!
//! Serializes sequences of [`MigrationItem`](wisp_core::MigrationItem)s
//! into flat byte buffers for the collective exchange, and back. All
//! integers and floats are little-endian with fixed widths, written
//! field-by-field in a declared order — endianness and padding are never
//! left to the host struct layout, so differently built processes agree
//! on every byte.
//!
//! # Format
//!
//! ```text
//! [item 0][item 1]...[item n-1]
//! item := [current record][previous record][array 0 tuple]...[array k-1 tuple]
//! ```
//!
//! Every item has the same stride, fixed by the run's prototype attribute
//! schema, so the buffer carries no count and no per-item length prefix:
//! `count = len / stride`. This is valid only because the schema is
//! identical and immutable on every process for the lifetime of a run —
//! an invariant enforced at setup time, not re-validated per message.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;

pub use codec::{
    decode_items, decode_record, encode_items, encode_record, item_stride, RECORD_WIRE_SIZE,
};
pub use error::WireError;
