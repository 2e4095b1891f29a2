//! Benchmark profiles and builders for the Wisp particle-migration
//! framework.
//!
//! Provides deterministic migration-item builders shared by the codec
//! and exchange benchmarks.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use smallvec::smallvec;
use wisp_core::{
    AttributeSchema, AttributeSnapshot, MigrationItem, ParticleId, ParticleRecord, SourceId,
};

/// The reference benchmark schema: 3-component velocity, 1-component
/// temperature, 1-component pressure.
pub fn reference_schema() -> AttributeSchema {
    let mut schema = AttributeSchema::new();
    schema
        .push_array("velocity", 3)
        .expect("fresh schema accepts velocity");
    schema
        .push_array("temperature", 1)
        .expect("fresh schema accepts temperature");
    schema
        .push_array("pressure", 1)
        .expect("fresh schema accepts pressure");
    schema
}

/// Build `n` deterministic migration items matching [`reference_schema`].
pub fn reference_items(n: usize) -> Vec<MigrationItem> {
    (0..n)
        .map(|i| {
            let mut record = ParticleRecord::seed_candidate(
                [i as f64 * 0.01, 0.5, 0.5],
                0.0,
                SourceId(0),
                i as i64,
                0,
            );
            record.unique_id = ParticleId(i as i64);
            record.time_step_age = (i % 100) as i32;
            MigrationItem {
                current: record,
                previous: record,
                previous_attributes: AttributeSnapshot {
                    tuples: vec![
                        smallvec![i as f64, -(i as f64), 0.5],
                        smallvec![300.0 + i as f64],
                        smallvec![101.0],
                    ],
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_items_match_reference_schema() {
        let schema = reference_schema();
        for item in reference_items(10) {
            item.previous_attributes.validate(&schema).unwrap();
        }
    }

    #[test]
    fn reference_items_are_deterministic() {
        assert_eq!(reference_items(5), reference_items(5));
    }
}
