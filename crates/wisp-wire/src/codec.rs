//! Field-by-field encode/decode of particle records and migration items.

use smallvec::SmallVec;

use wisp_core::{
    AttributeSchema, AttributeSnapshot, CellId, DataSetId, MigrationItem, ParticleId,
    ParticleRecord, ParticleStatus, SourceId,
};

use crate::error::WireError;

/// Encoded size of one [`ParticleRecord`] in bytes.
///
/// Field order (all little-endian):
/// position `4 × f64`, point_id `i64`, location_state `i32`,
/// cached_cell_id `2 × i64`, cached_dataset_id `2 × i32`, source_id `i32`,
/// injected_point_id `i64`, injected_step_id `i32`, time_step_age `i32`,
/// unique_id `i64`, rotation/angular_vel/age/speed/time `5 × f64`,
/// status `u8`.
pub const RECORD_WIRE_SIZE: usize = 4 * 8 + 8 + 4 + 2 * 8 + 2 * 4 + 4 + 8 + 4 + 4 + 8 + 5 * 8 + 1;

/// Byte stride of one migration item under `schema`: two records plus one
/// `f64` per attribute component.
pub fn item_stride(schema: &AttributeSchema) -> usize {
    2 * RECORD_WIRE_SIZE + schema.total_components() as usize * 8
}

// ── Primitive writers ───────────────────────────────────────────

fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

// ── Primitive readers ───────────────────────────────────────────

fn take_f64(data: &[u8], offset: &mut usize, what: &str) -> Result<f64, WireError> {
    let end = *offset + 8;
    if end > data.len() {
        return Err(WireError::Truncated { detail: what.into() });
    }
    let v = f64::from_le_bytes(data[*offset..end].try_into().unwrap());
    *offset = end;
    Ok(v)
}

fn take_i64(data: &[u8], offset: &mut usize, what: &str) -> Result<i64, WireError> {
    let end = *offset + 8;
    if end > data.len() {
        return Err(WireError::Truncated { detail: what.into() });
    }
    let v = i64::from_le_bytes(data[*offset..end].try_into().unwrap());
    *offset = end;
    Ok(v)
}

fn take_i32(data: &[u8], offset: &mut usize, what: &str) -> Result<i32, WireError> {
    let end = *offset + 4;
    if end > data.len() {
        return Err(WireError::Truncated { detail: what.into() });
    }
    let v = i32::from_le_bytes(data[*offset..end].try_into().unwrap());
    *offset = end;
    Ok(v)
}

fn take_u8(data: &[u8], offset: &mut usize, what: &str) -> Result<u8, WireError> {
    if *offset >= data.len() {
        return Err(WireError::Truncated { detail: what.into() });
    }
    let v = data[*offset];
    *offset += 1;
    Ok(v)
}

// ── Record codec ────────────────────────────────────────────────

/// Append one record to `buf` in the declared field order.
pub fn encode_record(buf: &mut Vec<u8>, record: &ParticleRecord) {
    for &c in &record.position {
        put_f64(buf, c);
    }
    put_i64(buf, record.point_id);
    put_i32(buf, record.location_state);
    for &cell in &record.cached_cell_id {
        put_i64(buf, cell.0);
    }
    for &ds in &record.cached_dataset_id {
        put_i32(buf, ds.0);
    }
    put_i32(buf, record.source_id.0);
    put_i64(buf, record.injected_point_id);
    put_i32(buf, record.injected_step_id);
    put_i32(buf, record.time_step_age);
    put_i64(buf, record.unique_id.0);
    put_f64(buf, record.rotation);
    put_f64(buf, record.angular_vel);
    put_f64(buf, record.age);
    put_f64(buf, record.speed);
    put_f64(buf, record.time);
    buf.push(record.status.as_tag());
}

/// Decode one record, advancing `offset`.
pub fn decode_record(data: &[u8], offset: &mut usize) -> Result<ParticleRecord, WireError> {
    let mut position = [0.0; 4];
    for c in &mut position {
        *c = take_f64(data, offset, "record position")?;
    }
    let point_id = take_i64(data, offset, "record point_id")?;
    let location_state = take_i32(data, offset, "record location_state")?;
    let mut cached_cell_id = [CellId::NONE; 2];
    for cell in &mut cached_cell_id {
        *cell = CellId(take_i64(data, offset, "record cached_cell_id")?);
    }
    let mut cached_dataset_id = [DataSetId(0); 2];
    for ds in &mut cached_dataset_id {
        *ds = DataSetId(take_i32(data, offset, "record cached_dataset_id")?);
    }
    let source_id = SourceId(take_i32(data, offset, "record source_id")?);
    let injected_point_id = take_i64(data, offset, "record injected_point_id")?;
    let injected_step_id = take_i32(data, offset, "record injected_step_id")?;
    let time_step_age = take_i32(data, offset, "record time_step_age")?;
    let unique_id = ParticleId(take_i64(data, offset, "record unique_id")?);
    let rotation = take_f64(data, offset, "record rotation")?;
    let angular_vel = take_f64(data, offset, "record angular_vel")?;
    let age = take_f64(data, offset, "record age")?;
    let speed = take_f64(data, offset, "record speed")?;
    let time = take_f64(data, offset, "record time")?;
    let tag = take_u8(data, offset, "record status")?;
    let status = ParticleStatus::from_tag(tag).ok_or(WireError::InvalidStatusTag { tag })?;

    Ok(ParticleRecord {
        position,
        point_id,
        location_state,
        cached_cell_id,
        cached_dataset_id,
        source_id,
        injected_point_id,
        injected_step_id,
        time_step_age,
        unique_id,
        rotation,
        angular_vel,
        age,
        speed,
        time,
        status,
    })
}

// ── Item sequence codec ─────────────────────────────────────────

/// Encode `items` in queue order into one flat buffer.
///
/// # Errors
///
/// [`WireError::Schema`] if any item's attribute snapshot disagrees with
/// the prototype `schema` — fatal for the round, detected before any
/// bytes leave the process.
pub fn encode_items(
    items: &[MigrationItem],
    schema: &AttributeSchema,
) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(items.len() * item_stride(schema));
    for item in items {
        item.previous_attributes.validate(schema)?;
        encode_record(&mut buf, &item.current);
        encode_record(&mut buf, &item.previous);
        for tuple in &item.previous_attributes.tuples {
            for &v in tuple.iter() {
                put_f64(&mut buf, v);
            }
        }
    }
    Ok(buf)
}

/// Decode a whole buffer of items produced by [`encode_items`] under the
/// same schema.
///
/// The item count is implicit: `data.len() / item_stride(schema)`.
/// Attribute tuples are matched to schema arrays by index — the schema
/// order is a cross-process contract fixed at setup time.
pub fn decode_items(
    data: &[u8],
    schema: &AttributeSchema,
) -> Result<Vec<MigrationItem>, WireError> {
    let stride = item_stride(schema);
    if data.len() % stride != 0 {
        return Err(WireError::LengthNotStrideMultiple {
            length: data.len(),
            stride,
        });
    }
    let count = data.len() / stride;
    let mut items = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        let current = decode_record(data, &mut offset)?;
        let previous = decode_record(data, &mut offset)?;
        let mut tuples = Vec::with_capacity(schema.array_count());
        for (name, components) in schema.iter() {
            let mut tuple = SmallVec::with_capacity(components as usize);
            for _ in 0..components {
                tuple.push(take_f64(data, &mut offset, name)?);
            }
            tuples.push(tuple);
        }
        items.push(MigrationItem {
            current,
            previous,
            previous_attributes: AttributeSnapshot { tuples },
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use smallvec::smallvec;

    fn two_array_schema() -> AttributeSchema {
        let mut schema = AttributeSchema::new();
        schema.push_array("velocity", 3).unwrap();
        schema.push_array("temperature", 1).unwrap();
        schema
    }

    fn sample_record(seed: i64) -> ParticleRecord {
        ParticleRecord {
            position: [seed as f64, seed as f64 + 0.5, -seed as f64, 0.25],
            point_id: seed,
            location_state: seed as i32,
            cached_cell_id: [CellId(seed * 2), CellId::NONE],
            cached_dataset_id: [DataSetId(0), DataSetId(1)],
            source_id: SourceId(3),
            injected_point_id: seed + 10,
            injected_step_id: 2,
            time_step_age: 5,
            unique_id: ParticleId(seed + 100),
            rotation: 0.1,
            angular_vel: 0.2,
            age: 0.3,
            speed: 0.4,
            time: 0.5,
            status: ParticleStatus::Ok,
        }
    }

    fn sample_item(seed: i64) -> MigrationItem {
        MigrationItem {
            current: sample_record(seed),
            previous: sample_record(seed - 1),
            previous_attributes: AttributeSnapshot {
                tuples: vec![
                    smallvec![seed as f64, 0.0, 1.0],
                    smallvec![seed as f64 * 2.0],
                ],
            },
        }
    }

    // ── Strategies ──────────────────────────────────────────────

    fn arb_status() -> impl Strategy<Value = ParticleStatus> {
        prop_oneof![
            Just(ParticleStatus::Ok),
            Just(ParticleStatus::Terminated),
            Just(ParticleStatus::OutOfDomain),
            Just(ParticleStatus::OutOfTimeWindow),
            Just(ParticleStatus::IntegrationFailed),
        ]
    }

    prop_compose! {
        fn arb_record()(
            position in prop::array::uniform4(-1e6f64..1e6),
            point_id in -1i64..1_000_000,
            location_state in any::<i32>(),
            cells in prop::array::uniform2(-1i64..1_000_000),
            datasets in prop::array::uniform2(-1i32..64),
            provenance in (0i32..8, 0i64..1_000_000, 0i32..1000, 0i32..10_000),
            unique_id in -1i64..i64::MAX / 2,
            scalars in prop::array::uniform5(-1e3f64..1e3),
            status in arb_status(),
        ) -> ParticleRecord {
            let (source_id, injected_point_id, injected_step_id, time_step_age) = provenance;
            ParticleRecord {
                position,
                point_id,
                location_state,
                cached_cell_id: [CellId(cells[0]), CellId(cells[1])],
                cached_dataset_id: [DataSetId(datasets[0]), DataSetId(datasets[1])],
                source_id: SourceId(source_id),
                injected_point_id,
                injected_step_id,
                time_step_age,
                unique_id: ParticleId(unique_id),
                rotation: scalars[0],
                angular_vel: scalars[1],
                age: scalars[2],
                speed: scalars[3],
                time: scalars[4],
                status,
            }
        }
    }

    fn arb_item() -> impl Strategy<Value = MigrationItem> {
        (
            arb_record(),
            arb_record(),
            prop::collection::vec(-1e6f64..1e6, 3),
            -1e6f64..1e6,
        )
            .prop_map(|(current, previous, vel, temp)| MigrationItem {
                current,
                previous,
                previous_attributes: AttributeSnapshot {
                    tuples: vec![SmallVec::from_vec(vel), smallvec![temp]],
                },
            })
    }

    // ── Record round-trip ───────────────────────────────────────

    #[test]
    fn record_wire_size_matches_encoding() {
        let mut buf = Vec::new();
        encode_record(&mut buf, &sample_record(7));
        assert_eq!(buf.len(), RECORD_WIRE_SIZE);
    }

    #[test]
    fn record_round_trips() {
        let record = sample_record(42);
        let mut buf = Vec::new();
        encode_record(&mut buf, &record);
        let mut offset = 0;
        let got = decode_record(&buf, &mut offset).unwrap();
        assert_eq!(record, got);
        assert_eq!(offset, RECORD_WIRE_SIZE);
    }

    proptest! {
        #[test]
        fn record_round_trips_any(record in arb_record()) {
            let mut buf = Vec::new();
            encode_record(&mut buf, &record);
            let mut offset = 0;
            let got = decode_record(&buf, &mut offset).unwrap();
            prop_assert_eq!(record, got);
        }

        #[test]
        fn items_round_trip_any(items in prop::collection::vec(arb_item(), 1..8)) {
            let schema = two_array_schema();
            let bytes = encode_items(&items, &schema).unwrap();
            let got = decode_items(&bytes, &schema).unwrap();
            prop_assert_eq!(items, got);
        }
    }

    // ── Stride and layout ───────────────────────────────────────

    #[test]
    fn stride_counts_two_records_plus_components() {
        let schema = two_array_schema();
        assert_eq!(item_stride(&schema), 2 * RECORD_WIRE_SIZE + 4 * 8);
    }

    #[test]
    fn two_items_fill_exactly_two_strides() {
        // Schema of one 3-component and one 1-component array; two items
        // must occupy 2 * (2 * RECORD_WIRE_SIZE + 4 * 8) bytes.
        let schema = two_array_schema();
        let items = vec![sample_item(1), sample_item(2)];
        let bytes = encode_items(&items, &schema).unwrap();
        assert_eq!(bytes.len(), 2 * (2 * RECORD_WIRE_SIZE + 4 * 8));
    }

    #[test]
    fn empty_sequence_encodes_to_empty_buffer() {
        let schema = two_array_schema();
        let bytes = encode_items(&[], &schema).unwrap();
        assert!(bytes.is_empty());
        assert!(decode_items(&bytes, &schema).unwrap().is_empty());
    }

    #[test]
    fn empty_schema_carries_records_only() {
        let schema = AttributeSchema::new();
        let item = MigrationItem {
            current: sample_record(1),
            previous: sample_record(0),
            previous_attributes: AttributeSnapshot::default(),
        };
        let bytes = encode_items(std::slice::from_ref(&item), &schema).unwrap();
        assert_eq!(bytes.len(), 2 * RECORD_WIRE_SIZE);
        let got = decode_items(&bytes, &schema).unwrap();
        assert_eq!(got, vec![item]);
    }

    // ── Fault detection ─────────────────────────────────────────

    #[test]
    fn snapshot_against_wrong_schema_rejected() {
        let schema = two_array_schema();
        let mut item = sample_item(1);
        item.previous_attributes.tuples[0] = smallvec![1.0, 2.0];
        let err = encode_items(std::slice::from_ref(&item), &schema).unwrap_err();
        assert!(matches!(err, WireError::Schema(_)));
    }

    #[test]
    fn non_stride_multiple_rejected() {
        let schema = two_array_schema();
        let mut bytes = encode_items(&[sample_item(1)], &schema).unwrap();
        bytes.pop();
        let err = decode_items(&bytes, &schema).unwrap_err();
        assert!(matches!(err, WireError::LengthNotStrideMultiple { .. }));
    }

    #[test]
    fn invalid_status_tag_rejected() {
        let schema = AttributeSchema::new();
        let item = MigrationItem {
            current: sample_record(1),
            previous: sample_record(0),
            previous_attributes: AttributeSnapshot::default(),
        };
        let mut bytes = encode_items(std::slice::from_ref(&item), &schema).unwrap();
        // The status tag is the last byte of each record.
        bytes[RECORD_WIRE_SIZE - 1] = 0xEE;
        let err = decode_items(&bytes, &schema).unwrap_err();
        assert_eq!(err, WireError::InvalidStatusTag { tag: 0xEE });
    }

    #[test]
    fn truncated_record_rejected() {
        let mut buf = Vec::new();
        encode_record(&mut buf, &sample_record(3));
        buf.truncate(RECORD_WIRE_SIZE / 2);
        let mut offset = 0;
        let err = decode_record(&buf, &mut offset).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }
}
