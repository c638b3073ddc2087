//! Error taxonomy for unpacking.
//!
//! The set is closed and flat.  Every variant carries a stable numeric code
//! that the CLI uses as its process exit status, so codes are never reused
//! or renumbered.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::header::MAX_SUPPORTED_VERSION;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file does not exist: {}", .0.display())]
    NoSuchFile(PathBuf),

    #[error("not a regular file: {}", .0.display())]
    InvalidFile(PathBuf),

    #[error("file too small: need {needed} bytes, have {actual}")]
    TooSmall { needed: u64, actual: u64 },

    #[error("not a MacBinary file")]
    NotMacBinary,

    #[error("MacBinary minimum version {required:#04x} is too new, max supported is {supported:#04x}")]
    VersionTooNew { required: u8, supported: u8 },

    #[error("CRC mismatch: header says {stored:#06x}, computed {computed:#06x}")]
    CrcMismatch { computed: u16, stored: u16 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Fieldless mirror of [`Error`].  The discriminant is the stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    NoSuchFile    = 1,
    InvalidFile   = 2,
    TooSmall      = 3,
    NotMacBinary  = 4,
    VersionTooNew = 5,
    CrcMismatch   = 6,
    Io            = 7,
}

impl ErrorKind {
    /// Stable numeric code, also the CLI exit status.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoSuchFile(_)        => ErrorKind::NoSuchFile,
            Error::InvalidFile(_)       => ErrorKind::InvalidFile,
            Error::TooSmall { .. }      => ErrorKind::TooSmall,
            Error::NotMacBinary         => ErrorKind::NotMacBinary,
            Error::VersionTooNew { .. } => ErrorKind::VersionTooNew,
            Error::CrcMismatch { .. }   => ErrorKind::CrcMismatch,
            Error::Io(_)                => ErrorKind::Io,
        }
    }

    /// Stable numeric code, also the CLI exit status.
    pub fn code(&self) -> u8 {
        self.kind().code()
    }

    pub(crate) fn version_too_new(required: u8) -> Self {
        Error::VersionTooNew { required, supported: MAX_SUPPORTED_VERSION }
    }
}

/// An [`Error`] tied to the input it stopped on.  Returned by batch runs.
#[derive(Error, Debug)]
#[error("{}: {source}", .path.display())]
pub struct PathError {
    pub path:   PathBuf,
    #[source]
    pub source: Error,
}

impl PathError {
    pub fn code(&self) -> u8 {
        self.source.code()
    }
}
