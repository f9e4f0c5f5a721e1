//! Codec symmetry: `de(ser(x)) == x` for every record type, including every
//! subset of optional `EntityUpdate` fields.

use meadow_shared::{
    read_records, ActionCode, ByteReader, ByteWriter, EntityId, EntityKind, EntityUpdate,
    PlayerFlags, RegionCoord, RegionPayload, StateFlags, TileData, TileType, UpdateRecord,
    WireSerde, WorldUpdate,
};

/// Builds an update with exactly the fields selected by `bits` present, one
/// bit per field in wire order (bit 11 = the switch-region flag).
fn update_with_fields(bits: u16) -> EntityUpdate {
    let mut update = EntityUpdate::new(EntityId::new(7_000_000));
    if bits & (1 << 0) != 0 {
        update.kind = Some(EntityKind::Pony);
    }
    if bits & (1 << 1) != 0 {
        update.x = Some(101.25);
    }
    if bits & (1 << 2) != 0 {
        update.y = Some(-7.5);
    }
    if bits & (1 << 3) != 0 {
        update.vx = Some(0.125);
    }
    if bits & (1 << 4) != 0 {
        update.vy = Some(-0.375);
    }
    if bits & (1 << 5) != 0 {
        update.state = Some(StateFlags::new(0b11_0010));
    }
    if bits & (1 << 6) != 0 {
        update.player_state = Some(PlayerFlags::new(PlayerFlags::HIDDEN | PlayerFlags::BAD_NAME));
    }
    if bits & (1 << 7) != 0 {
        update.appearance = Some(vec![0xab; 19]);
    }
    if bits & (1 << 8) != 0 {
        update.name = Some("Twinkle Dust".to_string());
    }
    if bits & (1 << 9) != 0 {
        update.crc = Some(0x1234_5678);
    }
    if bits & (1 << 10) != 0 {
        update.action = Some(ActionCode::Sneeze);
    }
    update.switch_region = bits & (1 << 11) != 0;
    update
}

fn assert_round_trip(record: &UpdateRecord) {
    let bytes = record.to_bytes();
    let mut reader = ByteReader::new(&bytes);
    let decoded = UpdateRecord::de(&mut reader).expect("decode failed");
    assert!(reader.is_empty(), "bytes left over after decode");
    assert_eq!(&decoded, record);
}

#[test]
fn entity_update_round_trips_for_every_field_subset() {
    for bits in 0u16..(1 << 12) {
        let update = update_with_fields(bits);
        assert_round_trip(&UpdateRecord::AddEntity(update.clone()));
        assert_round_trip(&UpdateRecord::UpdateEntity(update));
    }
}

#[test]
fn remove_and_tile_records_round_trip() {
    assert_round_trip(&UpdateRecord::RemoveEntity(EntityId::new(u32::MAX)));
    assert_round_trip(&UpdateRecord::RemoveEntity(EntityId::new(0)));
    for tile in [
        TileType::None,
        TileType::Grass,
        TileType::WalkableWater,
        TileType::WallV,
    ] {
        assert_round_trip(&UpdateRecord::UpdateTile {
            x: u16::MAX,
            y: 0,
            tile,
        });
    }
}

#[test]
fn record_stream_preserves_order() {
    let records = vec![
        UpdateRecord::AddEntity(update_with_fields(0b111)),
        UpdateRecord::UpdateTile {
            x: 3,
            y: 9,
            tile: TileType::Ice,
        },
        UpdateRecord::UpdateEntity(update_with_fields(0b1000_0010_0000)),
        UpdateRecord::RemoveEntity(EntityId::new(12)),
    ];
    let mut writer = ByteWriter::new();
    meadow_shared::write_records(&records, &mut writer);
    let bytes = writer.to_bytes();

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(read_records(&mut reader).unwrap(), records);
}

#[test]
fn region_payload_with_entities_round_trips() {
    let payload = RegionPayload {
        coord: RegionCoord::new(5, -2),
        entities: vec![
            update_with_fields(0b0111_1111_1111),
            update_with_fields(0),
        ],
        tiles: TileData::filled(TileType::SnowOnIce),
    };
    let bytes = payload.to_bytes();
    let mut reader = ByteReader::new(&bytes);
    assert_eq!(RegionPayload::de(&mut reader).unwrap(), payload);
    assert!(reader.is_empty());
}

#[test]
fn empty_world_update_round_trips() {
    let update = WorldUpdate::empty();
    let bytes = update.to_bytes();
    let mut reader = ByteReader::new(&bytes);
    assert_eq!(WorldUpdate::de(&mut reader).unwrap(), update);
}
