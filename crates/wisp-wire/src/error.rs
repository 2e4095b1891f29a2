//! Error types for the migration codec.

use std::error::Error;
use std::fmt;

use wisp_core::SchemaError;

/// Errors from encoding or decoding migration buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireError {
    /// The buffer length is not a whole number of items.
    LengthNotStrideMultiple {
        /// Buffer length in bytes.
        length: usize,
        /// Item stride for the active schema.
        stride: usize,
    },
    /// The buffer ended inside a record or tuple.
    Truncated {
        /// What was being read when the data ran out.
        detail: String,
    },
    /// A particle status tag is not recognized.
    InvalidStatusTag {
        /// The unrecognized tag.
        tag: u8,
    },
    /// A snapshot's shape disagrees with the prototype schema.
    ///
    /// Fatal for the exchange round: the schema is fixed per run, so a
    /// mismatch means the group no longer shares a wire format.
    Schema(SchemaError),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthNotStrideMultiple { length, stride } => {
                write!(
                    f,
                    "buffer of {length} bytes is not a multiple of the {stride}-byte item stride"
                )
            }
            Self::Truncated { detail } => write!(f, "truncated buffer: {detail}"),
            Self::InvalidStatusTag { tag } => write!(f, "invalid particle status tag {tag}"),
            Self::Schema(e) => write!(f, "schema mismatch: {e}"),
        }
    }
}

impl Error for WireError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for WireError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
