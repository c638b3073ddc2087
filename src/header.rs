//! MacBinary header decoding.
//!
//! # Layout
//! The header is a fixed 128-byte block at offset 0.  Only the fields needed
//! to split the container are decoded; everything else (Finder flags, dates,
//! MacBinary III signature) is ignored.  All multi-byte integers are
//! big-endian on disk.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | `0x00` | 1 | old version number, must be 0 |
//! | `0x01` | 1 | file name length `N`, `1..=63` |
//! | `0x02` | N | file name |
//! | `0x41` | 4 | file type |
//! | `0x53` | 4 | data fork length |
//! | `0x57` | 4 | resource fork length |
//! | `0x63` | 2 | Get-Info comment length |
//! | `0x78` | 2 | secondary header length |
//! | `0x7B` | 1 | minimum MacBinary version needed to read |
//! | `0x7C` | 2 | CRC-16/XMODEM over bytes `0x00..0x7C` |
//!
//! # Validation order
//! Old version byte, name length, minimum version, then CRC.  The CRC is
//! checked over the raw on-disk bytes before any field is interpreted.

use byteorder::{BigEndian, ByteOrder};
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::crc::XMODEM;
use crate::error::{Error, Result};

/// Size of the fixed header block, and the alignment unit of every segment.
pub const HEADER_SIZE: usize = 128;
/// Highest "minimum version" value this reader accepts (MacBinary III).
pub const MAX_SUPPORTED_VERSION: u8 = 0x81;
pub const MAX_NAME_LEN: u8 = 63;

/// Byte offsets into the header block.  Single source of truth for the layout.
pub mod offsets {
    pub const OLD_VERSION: usize = 0x00;
    pub const NAME_LEN:    usize = 0x01;
    pub const NAME:        usize = 0x02;
    pub const FILE_TYPE:   usize = 0x41;
    pub const DATA_LEN:    usize = 0x53;
    pub const RES_LEN:     usize = 0x57;
    pub const COMMENT_LEN: usize = 0x63;
    pub const SEC_HDR_LEN: usize = 0x78;
    pub const MIN_VERSION: usize = 0x7B;
    pub const CRC:         usize = 0x7C;
}

// ── Raw accessors ─────────────────────────────────────────────────────────────

/// Named, endian-converting view over an undecoded header block.
#[derive(Clone, Copy)]
pub struct RawHeader<'a> {
    buf: &'a [u8; HEADER_SIZE],
}

impl<'a> RawHeader<'a> {
    pub fn new(buf: &'a [u8; HEADER_SIZE]) -> Self {
        Self { buf }
    }

    fn be_u16(&self, at: usize) -> u16 { BigEndian::read_u16(&self.buf[at..at + 2]) }
    fn be_u32(&self, at: usize) -> u32 { BigEndian::read_u32(&self.buf[at..at + 4]) }

    pub fn old_version(&self) -> u8 { self.buf[offsets::OLD_VERSION] }
    pub fn name_len(&self)    -> u8 { self.buf[offsets::NAME_LEN] }
    pub fn min_version(&self) -> u8 { self.buf[offsets::MIN_VERSION] }

    /// Name bytes, clamped to the 63-byte name field.
    pub fn name(&self) -> &'a [u8] {
        let len = self.name_len().min(MAX_NAME_LEN) as usize;
        &self.buf[offsets::NAME..offsets::NAME + len]
    }

    pub fn file_type(&self) -> [u8; 4] {
        let mut t = [0u8; 4];
        t.copy_from_slice(&self.buf[offsets::FILE_TYPE..offsets::FILE_TYPE + 4]);
        t
    }

    pub fn data_len(&self)             -> u32 { self.be_u32(offsets::DATA_LEN) }
    pub fn resource_len(&self)         -> u32 { self.be_u32(offsets::RES_LEN) }
    pub fn comment_len(&self)          -> u16 { self.be_u16(offsets::COMMENT_LEN) }
    pub fn secondary_header_len(&self) -> u16 { self.be_u16(offsets::SEC_HDR_LEN) }
    pub fn stored_crc(&self)           -> u16 { self.be_u16(offsets::CRC) }

    /// The bytes covered by the header CRC.
    pub fn crc_span(&self) -> &'a [u8] {
        &self.buf[..offsets::CRC]
    }
}

// ── Decoded header ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Mac file name as stored, decoded lossily.
    pub name:                 String,
    pub file_type:            [u8; 4],
    pub data_len:             u32,
    pub resource_len:         u32,
    pub comment_len:          u16,
    pub secondary_header_len: u16,
}

impl Header {
    /// Validate and decode a raw header block.
    pub fn decode(block: &[u8; HEADER_SIZE]) -> Result<Self> {
        let raw = RawHeader::new(block);

        if raw.old_version() != 0 {
            debug!(old_version = raw.old_version(), "rejecting header: old version byte set");
            return Err(Error::NotMacBinary);
        }

        let name_len = raw.name_len();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            debug!(name_len, "rejecting header: name length out of range");
            return Err(Error::NotMacBinary);
        }

        if raw.min_version() > MAX_SUPPORTED_VERSION {
            return Err(Error::version_too_new(raw.min_version()));
        }

        let computed = XMODEM.checksum(raw.crc_span());
        let stored   = raw.stored_crc();
        if computed != stored {
            return Err(Error::CrcMismatch { computed, stored });
        }

        let header = Header {
            name:                 String::from_utf8_lossy(raw.name()).into_owned(),
            file_type:            raw.file_type(),
            data_len:             raw.data_len(),
            resource_len:         raw.resource_len(),
            comment_len:          raw.comment_len(),
            secondary_header_len: raw.secondary_header_len(),
        };
        debug!(?header, "decoded MacBinary header");
        Ok(header)
    }

    /// Read exactly one header block from `reader` and decode it.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut block = [0u8; HEADER_SIZE];
        reader.read_exact(&mut block)?;
        Self::decode(&block)
    }

    /// File type truncated at the first NUL, decoded lossily.
    pub fn file_type_str(&self) -> Cow<'_, str> {
        let end = self.file_type.iter().position(|&b| b == 0).unwrap_or(4);
        String::from_utf8_lossy(&self.file_type[..end])
    }

    /// Name usable as a single path component: `/` becomes `:` (the HFS
    /// convention) and NUL becomes `_`.
    pub fn safe_name(&self) -> String {
        self.name
            .chars()
            .map(|c| match c {
                '/'  => ':',
                '\0' => '_',
                c    => c,
            })
            .collect()
    }

    /// File name for the data fork.  Keeps the name's own extension if it has
    /// one, otherwise appends `.` and the file type.
    pub fn output_name(&self) -> String {
        let name = self.safe_name();
        if Path::new(&name).extension().is_some() {
            name
        } else {
            format!("{name}.{}", self.file_type_str())
        }
    }
}
