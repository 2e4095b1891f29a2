//! The fixed attribute schema and per-particle attribute snapshots.

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use crate::error::SchemaError;
use crate::particle::ParticleRecord;

/// One attribute tuple: the sampled components of a single named array.
///
/// Uses `SmallVec<[f64; 4]>` so scalar and 3-vector arrays (the common
/// cases) stay off the heap; wider tuples spill transparently.
pub type AttributeTuple = SmallVec<[f64; 4]>;

/// The prototype attribute schema: an ordered `array name → component
/// count` map.
///
/// The schema is identical and immutable across all processes for a run.
/// Array *order* is part of the wire contract — decoding matches arrays by
/// index, not name — which is why the map is an `IndexMap` rather than a
/// hash map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    arrays: IndexMap<String, u32>,
}

impl AttributeSchema {
    /// An empty schema (no attribute arrays carried during migration).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an array at the end of the schema order.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateArray`] if the name is already registered,
    /// [`SchemaError::ZeroComponents`] if `components` is zero.
    pub fn push_array(
        &mut self,
        name: impl Into<String>,
        components: u32,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if components == 0 {
            return Err(SchemaError::ZeroComponents { name });
        }
        if self.arrays.contains_key(&name) {
            return Err(SchemaError::DuplicateArray { name });
        }
        self.arrays.insert(name, components);
        Ok(())
    }

    /// Number of arrays in the schema.
    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the schema declares no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Component count of the array at `index` in schema order.
    pub fn components(&self, index: usize) -> Option<u32> {
        self.arrays.get_index(index).map(|(_, &c)| c)
    }

    /// Name of the array at `index` in schema order.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.arrays.get_index(index).map(|(n, _)| n.as_str())
    }

    /// Iterate `(name, components)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.arrays.iter().map(|(n, &c)| (n.as_str(), c))
    }

    /// Sum of all component counts — the number of `f64` values one
    /// snapshot contributes to a migration record.
    pub fn total_components(&self) -> u32 {
        self.arrays.values().sum()
    }
}

/// Sampled attribute values at a particle's location, one tuple per
/// schema array in schema order.
///
/// Associated 1:1 with a particle that is about to migrate, so the
/// receiving process can resume interpolation without re-sampling at the
/// exit point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSnapshot {
    /// One tuple per schema array, in schema order.
    pub tuples: Vec<AttributeTuple>,
}

impl AttributeSnapshot {
    /// Allocate a snapshot matching `schema`, all components zero.
    pub fn zeroed(schema: &AttributeSchema) -> Self {
        Self {
            tuples: schema
                .iter()
                .map(|(_, c)| smallvec![0.0; c as usize])
                .collect(),
        }
    }

    /// Check this snapshot's shape against the prototype schema.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ArrayCountMismatch`] or
    /// [`SchemaError::ComponentMismatch`] naming the first offending array.
    pub fn validate(&self, schema: &AttributeSchema) -> Result<(), SchemaError> {
        if self.tuples.len() != schema.array_count() {
            return Err(SchemaError::ArrayCountMismatch {
                expected: schema.array_count(),
                found: self.tuples.len(),
            });
        }
        for (index, tuple) in self.tuples.iter().enumerate() {
            let expected = schema.components(index).unwrap_or(0);
            if tuple.len() as u32 != expected {
                return Err(SchemaError::ComponentMismatch {
                    array: schema.name(index).unwrap_or("").to_string(),
                    expected,
                    found: tuple.len() as u32,
                });
            }
        }
        Ok(())
    }
}

/// One particle that left the local subdomain, queued for migration.
///
/// `previous` is the last known-good in-bounds state; the receiving
/// process resumes interpolation from it rather than needing the velocity
/// field at the exact exit point.
#[derive(Clone, Debug, PartialEq)]
pub struct MigrationItem {
    /// The particle's state after the step that left the subdomain.
    pub current: ParticleRecord,
    /// The last in-bounds state before the exit.
    pub previous: ParticleRecord,
    /// Attribute values sampled at the previous position.
    pub previous_attributes: AttributeSnapshot,
}
