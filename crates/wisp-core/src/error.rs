//! Schema validation errors shared across the workspace.

use std::error::Error;
use std::fmt;

/// Errors from attribute schema construction or snapshot validation.
///
/// A schema fault discovered while encoding or decoding migration data is
/// fatal for the whole exchange round: the schema is a cross-process
/// contract fixed at setup time, so a disagreement means the processes are
/// no longer speaking the same wire format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// An array name was registered twice.
    DuplicateArray {
        /// The offending array name.
        name: String,
    },
    /// An array was registered with zero components.
    ZeroComponents {
        /// The offending array name.
        name: String,
    },
    /// A snapshot carries a different number of arrays than the schema.
    ArrayCountMismatch {
        /// Arrays in the prototype schema.
        expected: usize,
        /// Arrays in the snapshot.
        found: usize,
    },
    /// A snapshot tuple's component count disagrees with the schema.
    ComponentMismatch {
        /// Name of the array, from the prototype schema.
        array: String,
        /// Component count declared by the schema.
        expected: u32,
        /// Component count found in the snapshot.
        found: u32,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateArray { name } => {
                write!(f, "attribute array '{name}' registered twice")
            }
            Self::ZeroComponents { name } => {
                write!(f, "attribute array '{name}' has zero components")
            }
            Self::ArrayCountMismatch { expected, found } => {
                write!(
                    f,
                    "snapshot has {found} attribute arrays, schema declares {expected}"
                )
            }
            Self::ComponentMismatch {
                array,
                expected,
                found,
            } => {
                write!(
                    f,
                    "array '{array}' has {found} components, schema declares {expected}"
                )
            }
        }
    }
}

impl Error for SchemaError {}
