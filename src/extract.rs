//! Unpacking: header decode, segment location and extraction in one pass.
//!
//! ```no_run
//! use macbin::extract::{unpack_file, UnpackOptions};
//!
//! let report = unpack_file("SimpleText.bin", &UnpackOptions::default())?;
//! for path in &report.outputs {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), macbin::Error>(())
//! ```
//!
//! # Output artifacts
//! The data fork is written to `<dir>/<name>` where `<name>` is the decoded
//! file name, with `.` and the file type appended when the name has no
//! extension of its own.  The resource fork and the comment go to the same
//! path with `.res` and `.cmt` appended.  Absent segments produce no file.
//!
//! Segments are handled in file order.  Each one is bounds-checked and then
//! copied before the next is looked at, so a container that is truncated
//! inside its resource fork still yields the data fork before failing.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, PathError, Result};
use crate::header::Header;
use crate::layout::{Segment, SegmentKind, SegmentLayout, BLOCK_SIZE};

// ── UnpackOptions ─────────────────────────────────────────────────────────────

/// Configuration for [`unpack_file`].
#[derive(Debug, Clone, Default)]
pub struct UnpackOptions {
    /// Directory for the artifacts.  `None` writes next to the source file.
    pub output_dir:   Option<PathBuf>,
    /// Leave an incompletely written artifact in place when copying fails.
    pub keep_partial: bool,
}

// ── Unpacked ──────────────────────────────────────────────────────────────────

/// What one successful [`unpack_file`] produced.
#[derive(Debug, Clone)]
pub struct Unpacked {
    pub source:  PathBuf,
    pub header:  Header,
    pub layout:  SegmentLayout,
    /// Every artifact written, in segment order.
    pub outputs: Vec<PathBuf>,
}

// ── Single file ───────────────────────────────────────────────────────────────

/// Check that `path` exists and is a regular file.  Returns its size.
pub fn check_source(path: &Path) -> Result<u64> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta.len()),
        Ok(_) => Err(Error::InvalidFile(path.to_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NoSuchFile(path.to_owned())),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Split the MacBinary file at `path` into its data fork, resource fork and
/// comment.
pub fn unpack_file<P: AsRef<Path>>(path: P, opts: &UnpackOptions) -> Result<Unpacked> {
    let path = path.as_ref();
    let file_size = check_source(path)?;
    if file_size < BLOCK_SIZE {
        return Err(Error::TooSmall { needed: BLOCK_SIZE, actual: file_size });
    }

    let mut src = BufReader::new(File::open(path)?);
    let header  = Header::read(&mut src)?;
    let layout  = SegmentLayout::locate(&header);

    let dir = match &opts.output_dir {
        Some(dir) => dir.as_path(),
        None      => path.parent().unwrap_or_else(|| Path::new("")),
    };
    let base = dir.join(header.output_name());
    debug!(source = %path.display(), base = %base.display(), ?layout, "located segments");
    refuse_overwriting_source(path, &layout, &base)?;

    let outputs = extract_segments(&mut src, &layout, file_size, &base, opts.keep_partial)?;
    info!(source = %path.display(), artifacts = outputs.len(), "unpacked");

    Ok(Unpacked { source: path.to_owned(), header, layout, outputs })
}

/// Fail before anything is created if an artifact path names the source
/// itself.  Creating it would truncate the input mid-read.
fn refuse_overwriting_source(source: &Path, layout: &SegmentLayout, base: &Path) -> Result<()> {
    let source = fs::canonicalize(source)?;
    for seg in layout.segments() {
        let dest = segment_path(base, seg.kind);
        // A destination that does not exist yet cannot be the source.
        let Ok(dest) = fs::canonicalize(&dest) else { continue };
        if dest == source {
            warn!(path = %dest.display(), segment = seg.kind.name(),
                  "artifact would overwrite source");
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} would overwrite the source file {}", seg.kind.name(), dest.display()),
            )));
        }
    }
    Ok(())
}

/// Copy every present segment of `layout` out of `src`.
///
/// `file_size` is the total length of `src`; a segment reaching past it fails
/// with [`Error::TooSmall`] before anything is written for it.
pub fn extract_segments<R: Read + Seek>(
    src:          &mut R,
    layout:       &SegmentLayout,
    file_size:    u64,
    base:         &Path,
    keep_partial: bool,
) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::new();
    for seg in layout.segments() {
        seg.check_bounds(file_size)?;
        let dest = segment_path(base, seg.kind);
        copy_segment(src, &seg, &dest, keep_partial)?;
        outputs.push(dest);
    }
    Ok(outputs)
}

/// Output path for `kind`: `base` with the segment's suffix appended.
pub fn segment_path(base: &Path, kind: SegmentKind) -> PathBuf {
    let mut p = OsString::from(base.as_os_str());
    p.push(kind.suffix());
    PathBuf::from(p)
}

fn copy_segment<R: Read + Seek>(
    src:          &mut R,
    seg:          &Segment,
    dest:         &Path,
    keep_partial: bool,
) -> Result<()> {
    src.seek(SeekFrom::Start(seg.offset))?;
    let out = File::create(dest)?;

    if let Err(e) = write_range(src, seg.len, out) {
        if !keep_partial {
            if let Err(rm) = fs::remove_file(dest) {
                warn!(path = %dest.display(), error = %rm, "could not remove partial artifact");
            }
        }
        return Err(e.into());
    }

    debug!(segment = seg.kind.name(), offset = seg.offset, len = seg.len,
           dest = %dest.display(), "wrote segment");
    Ok(())
}

fn write_range<R: Read>(src: &mut R, len: u64, out: File) -> io::Result<()> {
    let mut w = BufWriter::new(out);
    let copied = io::copy(&mut src.by_ref().take(len), &mut w)?;
    if copied < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("source ended after {copied} of {len} segment bytes"),
        ));
    }
    w.flush()
}

// ── Batches ───────────────────────────────────────────────────────────────────

/// Unpack `paths` in order, stopping at the first failure.
pub fn unpack_all<I, P>(paths: I, opts: &UnpackOptions) -> std::result::Result<Vec<Unpacked>, PathError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut done = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match unpack_file(path, opts) {
            Ok(u)  => done.push(u),
            Err(source) => {
                warn!(path = %path.display(), code = source.code(), error = %source, "unpack failed");
                return Err(PathError { path: path.to_owned(), source });
            }
        }
    }
    Ok(done)
}

/// Unpack every path independently on the rayon pool.  One result per input,
/// in input order; a failure does not stop the others.
///
/// Inputs whose artifacts would land on the same output path race with each
/// other.
#[cfg(feature = "parallel")]
pub fn unpack_all_parallel<P>(paths: &[P], opts: &UnpackOptions) -> Vec<Result<Unpacked>>
where
    P: AsRef<Path> + Sync,
{
    use rayon::prelude::*;

    paths.par_iter().map(|p| unpack_file(p, opts)).collect()
}
