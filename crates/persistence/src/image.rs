// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Device image header.
//!
//! An image is a 48-byte header followed by the raw bytes of region A and
//! then region B. The header pins the geometry and layout the regions were
//! written with, so a store reopened from the image reads them the same way.

use crate::error::{PersistenceError, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use seesaw_kernel::{Geometry, Layout, StoreConfig};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageHeader {
    pub version: u32,
    pub param_count: u16,
    pub layout: Layout,
    pub geometry: Geometry,
    /// Unix seconds at format time.
    pub created_at: u64,
}

impl ImageHeader {
    pub const SIZE: usize = 48;
    pub const MAGIC: [u8; 4] = *b"SSAW";
    pub const VERSION: u32 = 1;
    /// Bytes covered by the trailing checksum.
    const CHECKED: usize = 40;

    pub fn new(geometry: Geometry, layout: Layout, param_count: u16, created_at: u64) -> Self {
        Self {
            version: Self::VERSION,
            param_count,
            layout,
            geometry,
            created_at,
        }
    }

    /// Store configuration matching this image.
    pub fn config(&self, repair_on_load: bool) -> StoreConfig {
        StoreConfig {
            geometry: self.geometry,
            layout: self.layout,
            repair_on_load,
        }
    }

    /// Size of the region payload that follows the header.
    pub fn body_len(&self) -> u64 {
        2 * self.geometry.region_size as u64
    }

    pub fn image_len(&self) -> u64 {
        Self::SIZE as u64 + self.body_len()
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&Self::MAGIC);
        LittleEndian::write_u32(&mut buf[4..8], self.version);
        LittleEndian::write_u16(&mut buf[8..10], self.param_count);
        buf[10] = self.layout.as_u8();
        LittleEndian::write_u32(&mut buf[12..16], self.geometry.region_a);
        LittleEndian::write_u32(&mut buf[16..20], self.geometry.region_b);
        LittleEndian::write_u32(&mut buf[20..24], self.geometry.region_size);
        LittleEndian::write_u64(&mut buf[24..32], self.created_at);
        // 11 and 32..40 stay reserved (zero).
        let checksum = crc64(&buf[..Self::CHECKED]);
        LittleEndian::write_u64(&mut buf[Self::CHECKED..], checksum);
        buf
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;

        if buf[0..4] != Self::MAGIC {
            return Err(PersistenceError::InvalidMagic);
        }
        let mut cursor = &buf[4..];
        let version = cursor.read_u32::<LittleEndian>()?;
        let param_count = cursor.read_u16::<LittleEndian>()?;
        let layout_tag = cursor.read_u8()?;
        let _reserved = cursor.read_u8()?;
        let region_a = cursor.read_u32::<LittleEndian>()?;
        let region_b = cursor.read_u32::<LittleEndian>()?;
        let region_size = cursor.read_u32::<LittleEndian>()?;
        let created_at = cursor.read_u64::<LittleEndian>()?;
        let mut reserved = [0u8; 8];
        cursor.read_exact(&mut reserved)?;
        let stored = cursor.read_u64::<LittleEndian>()?;

        let computed = crc64(&buf[..Self::CHECKED]);
        if stored != computed {
            return Err(PersistenceError::ChecksumMismatch {
                expected: stored,
                found: computed,
            });
        }
        if version != Self::VERSION {
            return Err(PersistenceError::UnsupportedVersion(version));
        }
        let layout = Layout::from_u8(layout_tag)
            .ok_or_else(|| PersistenceError::InvalidFormat(format!("unknown layout tag {layout_tag}")))?;

        let header = Self {
            version,
            param_count,
            layout,
            geometry: Geometry {
                region_a,
                region_b,
                region_size,
            },
            created_at,
        };
        header.config(true).validate(param_count as usize)?;
        Ok(header)
    }
}

pub fn crc64(bytes: &[u8]) -> u64 {
    let mut digest = crc64fast::Digest::new();
    digest.write(bytes);
    digest.sum64()
}
