//! Synthetic MacBinary containers for tests.

#![allow(dead_code)]

use macbin::crc::XMODEM;
use macbin::header::{offsets, HEADER_SIZE, MAX_SUPPORTED_VERSION};
use std::path::{Path, PathBuf};

pub struct Fixture {
    pub name:        Vec<u8>,
    pub file_type:   [u8; 4],
    pub secondary:   Vec<u8>,
    pub data:        Vec<u8>,
    pub resource:    Vec<u8>,
    pub comment:     Vec<u8>,
    pub min_version: u8,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        Self {
            name:        name.as_bytes().to_vec(),
            file_type:   *b"TEXT",
            secondary:   Vec::new(),
            data:        Vec::new(),
            resource:    Vec::new(),
            comment:     Vec::new(),
            min_version: MAX_SUPPORTED_VERSION,
        }
    }

    pub fn data(mut self, bytes: &[u8]) -> Self { self.data = bytes.to_vec(); self }
    pub fn resource(mut self, bytes: &[u8]) -> Self { self.resource = bytes.to_vec(); self }
    pub fn comment(mut self, bytes: &[u8]) -> Self { self.comment = bytes.to_vec(); self }
    pub fn secondary(mut self, bytes: &[u8]) -> Self { self.secondary = bytes.to_vec(); self }
    pub fn file_type(mut self, t: &[u8; 4]) -> Self { self.file_type = *t; self }

    pub fn header(&self) -> [u8; HEADER_SIZE] {
        let mut b = [0u8; HEADER_SIZE];
        b[offsets::NAME_LEN] = self.name.len() as u8;
        b[offsets::NAME..offsets::NAME + self.name.len()].copy_from_slice(&self.name);
        b[offsets::FILE_TYPE..offsets::FILE_TYPE + 4].copy_from_slice(&self.file_type);
        b[offsets::DATA_LEN..offsets::DATA_LEN + 4]
            .copy_from_slice(&(self.data.len() as u32).to_be_bytes());
        b[offsets::RES_LEN..offsets::RES_LEN + 4]
            .copy_from_slice(&(self.resource.len() as u32).to_be_bytes());
        b[offsets::COMMENT_LEN..offsets::COMMENT_LEN + 2]
            .copy_from_slice(&(self.comment.len() as u16).to_be_bytes());
        b[offsets::SEC_HDR_LEN..offsets::SEC_HDR_LEN + 2]
            .copy_from_slice(&(self.secondary.len() as u16).to_be_bytes());
        b[offsets::MIN_VERSION] = self.min_version;
        reseal(&mut b);
        b
    }

    /// Header plus every present region, each padded to 128 bytes.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.header().to_vec();
        for region in [&self.secondary, &self.data, &self.resource, &self.comment] {
            out.extend_from_slice(region);
            while out.len() % HEADER_SIZE != 0 {
                out.push(0);
            }
        }
        out
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.bytes()).unwrap();
        path
    }
}

/// Recompute the header CRC after editing raw bytes.
pub fn reseal(b: &mut [u8]) {
    let crc = XMODEM.checksum(&b[..offsets::CRC]);
    b[offsets::CRC..offsets::CRC + 2].copy_from_slice(&crc.to_be_bytes());
}
