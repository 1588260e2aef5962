// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::{ERASED_RECORD, GENERATION_MARKER_ID};
use crate::storage::record::encode_generation;
use crate::storage::{Record, SlotState};

#[test]
fn test_record_byte_layout() {
    let raw = Record::new(0x0102, 0x0A0B_0C0D).encode();
    // [id LE][value LE][tag LE]
    assert_eq!(raw, [0x02, 0x01, 0x0D, 0x0C, 0x0B, 0x0A, 0x5A, 0xA5]);
}

#[test]
fn test_negative_value_survives() {
    let raw = Record::new(3, -123_456).encode();
    assert_eq!(SlotState::decode(&raw, 4), SlotState::Valid(Record::new(3, -123_456)));
}

#[test]
fn test_erased_slot_decodes_as_erased() {
    assert_eq!(SlotState::decode(&ERASED_RECORD, 50), SlotState::Erased);
    // Regardless of table size.
    assert_eq!(SlotState::decode(&ERASED_RECORD, 0), SlotState::Erased);
}

#[test]
fn test_tag_mismatch_is_corrupt() {
    let mut raw = Record::new(1, 7).encode();
    raw[7] = 0xFF; // torn: tag half erased
    assert_eq!(SlotState::decode(&raw, 4), SlotState::Corrupt);

    let mut raw = Record::new(1, 7).encode();
    raw[6] ^= 0x01;
    assert_eq!(SlotState::decode(&raw, 4), SlotState::Corrupt);
}

#[test]
fn test_out_of_range_id_is_corrupt() {
    let raw = Record::new(4, 1).encode();
    assert_eq!(SlotState::decode(&raw, 4), SlotState::Corrupt);
    assert_eq!(SlotState::decode(&raw, 5), SlotState::Valid(Record::new(4, 1)));
}

#[test]
fn test_generation_marker() {
    let raw = encode_generation(0xDEAD_BEEF);
    assert_eq!(u16::from_le_bytes([raw[0], raw[1]]), GENERATION_MARKER_ID);
    assert_eq!(SlotState::decode(&raw, 50), SlotState::Generation(0xDEAD_BEEF));
}

#[test]
fn test_half_programmed_record_is_not_valid() {
    let full = Record::new(2, 99).encode();
    let mut torn = ERASED_RECORD;
    torn[..4].copy_from_slice(&full[..4]);
    assert_eq!(SlotState::decode(&torn, 4), SlotState::Corrupt);
}
