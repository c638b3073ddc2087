//! Segment location.
//!
//! After the 128-byte header comes the optional secondary header, then the
//! data fork, the resource fork and the Get-Info comment, in that order.
//! Each region starts on a 128-byte boundary: the region before it is padded
//! up to the next multiple of 128.  An absent region (length 0) occupies no
//! space and contributes no padding.
//!
//! The MacBinary II+ draft places the comment right after the secondary
//! header.  That draft contradicts itself and was never adopted, so the
//! comment is always located after the resource fork.

use crate::error::{Error, Result};
use crate::header::{Header, HEADER_SIZE};

/// Alignment unit for every region in the container.
pub const BLOCK_SIZE: u64 = HEADER_SIZE as u64;

/// Padding needed to bring a region of `len` bytes up to a block boundary.
#[inline]
pub fn pad_to_block(len: u64) -> u64 {
    (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

/// Padding after a region, applied only when the region is present.
#[inline]
fn trailing_pad(len: u64) -> u64 {
    if len > 0 { pad_to_block(len) } else { 0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Data,
    Resource,
    Comment,
}

impl SegmentKind {
    /// Suffix appended to the base output path.
    pub fn suffix(self) -> &'static str {
        match self {
            SegmentKind::Data     => "",
            SegmentKind::Resource => ".res",
            SegmentKind::Comment  => ".cmt",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::Data     => "data fork",
            SegmentKind::Resource => "resource fork",
            SegmentKind::Comment  => "comment",
        }
    }
}

/// A byte range inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind:   SegmentKind,
    pub offset: u64,
    pub len:    u64,
}

impl Segment {
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }

    /// Fail with `TooSmall` unless the whole range lies within `file_size`.
    pub fn check_bounds(&self, file_size: u64) -> Result<()> {
        if file_size < self.end() {
            return Err(Error::TooSmall { needed: self.end(), actual: file_size });
        }
        Ok(())
    }
}

/// Where each present segment lives.  Derived from a [`Header`]; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    /// Offset of the first byte after the header and secondary header.
    pub data_base: u64,
    pub data:      Option<Segment>,
    pub resource:  Option<Segment>,
    pub comment:   Option<Segment>,
}

impl SegmentLayout {
    pub fn locate(header: &Header) -> Self {
        let sec_len  = u64::from(header.secondary_header_len);
        let data_len = u64::from(header.data_len);
        let res_len  = u64::from(header.resource_len);
        let cmt_len  = u64::from(header.comment_len);

        let data_base    = BLOCK_SIZE + sec_len + trailing_pad(sec_len);
        let res_base     = data_base + data_len + trailing_pad(data_len);
        let comment_base = res_base + res_len + trailing_pad(res_len);

        let seg = |kind: SegmentKind, offset: u64, len: u64| {
            (len > 0).then_some(Segment { kind, offset, len })
        };

        Self {
            data_base,
            data:     seg(SegmentKind::Data, data_base, data_len),
            resource: seg(SegmentKind::Resource, res_base, res_len),
            comment:  seg(SegmentKind::Comment, comment_base, cmt_len),
        }
    }

    /// Present segments in file order.
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        [self.data, self.resource, self.comment].into_iter().flatten()
    }

    /// Smallest file size that holds every present segment.
    pub fn required_len(&self) -> u64 {
        self.segments().map(|s| s.end()).max().unwrap_or(BLOCK_SIZE)
    }
}
