pub mod crc;
pub mod error;
pub mod header;
pub mod layout;
pub mod extract;

pub use error::{Error, ErrorKind, PathError, Result};
pub use header::{Header, RawHeader, HEADER_SIZE, MAX_SUPPORTED_VERSION};
pub use layout::{Segment, SegmentKind, SegmentLayout};
pub use extract::{unpack_all, unpack_file, UnpackOptions, Unpacked};
