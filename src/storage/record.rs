//! Record definition and codec.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use byteorder::{ByteOrder, LittleEndian};

use crate::config::{ERASED_RECORD, GENERATION_MARKER_ID, RECORD_SIZE, RECORD_TAG};

/// Raw bits of one slot as read from the medium.
pub type RawRecord = [u8; RECORD_SIZE];

/// One parameter update.
///
/// Layout (little-endian, 8 bytes):
/// [param_id: u16][value: i32][tag: u16]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub param_id: u16,
    pub value: i32,
}

impl Record {
    pub const fn new(param_id: u16, value: i32) -> Self {
        Self { param_id, value }
    }

    pub fn encode(&self) -> RawRecord {
        encode_raw(self.param_id, self.value as u32)
    }
}

/// Encodes the generation marker written at slot 0 of a generational region.
pub fn encode_generation(generation: u32) -> RawRecord {
    encode_raw(GENERATION_MARKER_ID, generation)
}

fn encode_raw(param_id: u16, bits: u32) -> RawRecord {
    let mut buf = [0u8; RECORD_SIZE];
    LittleEndian::write_u16(&mut buf[0..2], param_id);
    LittleEndian::write_u32(&mut buf[2..6], bits);
    LittleEndian::write_u16(&mut buf[6..8], RECORD_TAG);
    buf
}

/// Decoded state of a slot, validated against the table size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SlotState {
    /// Never written since the last erase. Marks the end of the log.
    Erased,
    /// Completed write of an in-range parameter.
    Valid(Record),
    /// Generation marker.
    Generation(u32),
    /// Torn write, foreign data or an id outside the table.
    Corrupt,
}

impl SlotState {
    pub fn decode(raw: &RawRecord, param_count: usize) -> Self {
        if *raw == ERASED_RECORD {
            return SlotState::Erased;
        }
        if LittleEndian::read_u16(&raw[6..8]) != RECORD_TAG {
            return SlotState::Corrupt;
        }
        let param_id = LittleEndian::read_u16(&raw[0..2]);
        let bits = LittleEndian::read_u32(&raw[2..6]);
        if (param_id as usize) < param_count {
            SlotState::Valid(Record::new(param_id, bits as i32))
        } else if param_id == GENERATION_MARKER_ID {
            SlotState::Generation(bits)
        } else {
            SlotState::Corrupt
        }
    }

    pub fn is_erased(&self) -> bool {
        matches!(self, SlotState::Erased)
    }
}
