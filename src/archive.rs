//! Multi-file packing and the filesystem side of compress/decompress.
//!
//! Files are concatenated in input order into one buffer, and a boundary
//! table records where each one landed. Only base names are kept, so
//! extraction flattens any directory structure.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::container::{validate_name, FileBoundary};
use crate::error::{try_reserve, Error, Result};

/// Extension given to containers written by [`container_path`].
pub const CONTAINER_EXTENSION: &str = "cmp";

/// A named file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Base file name.
    pub name: String,
    /// File contents.
    pub data: Vec<u8>,
}

impl Entry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Strip any directory prefix from `name` and cap it at `max_len` bytes.
///
/// Both `/` and `\` count as separators. Truncation never splits a
/// UTF-8 character.
pub fn stored_name(name: &str, max_len: usize) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut cut = base.len().min(max_len);
    while !base.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut < base.len() {
        warn!(name = base, max_len, "truncating long file name");
    }

    let stored = &base[..cut];
    validate_name(stored)?;
    Ok(stored.to_string())
}

/// Concatenate `entries` and record each one's span.
///
/// # Errors
/// - [`Error::EmptyInput`] if there are no entries or all are empty.
/// - [`Error::Format`] if a name is unusable or two entries share a name.
/// - [`Error::AllocationFailed`] if the combined buffer cannot be reserved.
pub fn pack(entries: &[Entry], config: &Config) -> Result<(Vec<u8>, Vec<FileBoundary>)> {
    let total: usize = entries.iter().map(|e| e.data.len()).sum();
    if total == 0 {
        return Err(Error::EmptyInput);
    }

    let mut buffer = Vec::new();
    try_reserve(&mut buffer, total)?;
    let mut boundaries: Vec<FileBoundary> = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = stored_name(&entry.name, config.max_name_len)?;
        if boundaries.iter().any(|b| b.name == name) {
            return Err(Error::format(format!("duplicate file name {name:?}")));
        }
        boundaries.push(FileBoundary {
            name,
            start: buffer.len() as u64,
            len: entry.data.len() as u64,
        });
        buffer.extend_from_slice(&entry.data);
    }

    debug!(files = boundaries.len(), bytes = buffer.len(), "packed files");
    Ok((buffer, boundaries))
}

/// Slice a decoded buffer back into entries.
///
/// # Errors
/// [`Error::Format`] if the boundaries do not tile `buffer` exactly.
pub fn unpack(buffer: &[u8], boundaries: &[FileBoundary]) -> Result<Vec<Entry>> {
    let covered: u64 = boundaries.iter().map(|b| b.len).sum();
    if covered != buffer.len() as u64 {
        return Err(Error::format(format!(
            "boundary table covers {covered} bytes but the stream decoded to {}",
            buffer.len()
        )));
    }

    boundaries
        .iter()
        .map(|b| {
            let range = b.start as usize..b.end() as usize;
            let data = buffer
                .get(range)
                .ok_or_else(|| Error::format(format!("file {:?} lies outside the buffer", b.name)))?;
            Ok(Entry::new(b.name.clone(), data))
        })
        .collect()
}

/// Read every file in `paths` fully, in order.
///
/// # Errors
/// [`Error::File`] for the first path that cannot be read.
pub fn read_files<P: AsRef<Path>>(paths: &[P], config: &Config) -> Result<Vec<Entry>> {
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::format(format!("{} does not name a file", path.display())))?;
        let name = stored_name(&file_name.to_string_lossy(), config.max_name_len)?;
        let data = fs::read(path).map_err(|e| Error::file(path, e))?;
        debug!(path = %path.display(), bytes = data.len(), "read input file");
        entries.push(Entry { name, data });
    }
    Ok(entries)
}

/// Write each entry to `out_dir/name`, creating `out_dir` if needed.
///
/// If any write fails, files already written by this call are removed
/// before the error is returned.
pub fn extract(entries: &[Entry], out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !out_dir.as_os_str().is_empty() && out_dir != Path::new(".") {
        fs::create_dir_all(out_dir).map_err(|e| Error::file(out_dir, e))?;
    }

    let mut written = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = validate_name(&entry.name).and_then(|()| {
            let path = out_dir.join(&entry.name);
            fs::write(&path, &entry.data)
                .map(|()| path.clone())
                .map_err(|e| Error::file(path, e))
        });

        match result {
            Ok(path) => {
                info!(path = %path.display(), bytes = entry.data.len(), "extracted");
                written.push(path);
            }
            Err(err) => {
                for path in &written {
                    if let Err(e) = fs::remove_file(path) {
                        warn!(path = %path.display(), error = %e, "could not remove partial output");
                    }
                }
                return Err(err);
            }
        }
    }
    Ok(written)
}

/// Default container name for a file set: the first file's stem plus
/// `.cmp`, in the current directory.
pub fn container_path(first: &Path) -> PathBuf {
    let stem = first
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    PathBuf::from(format!("{stem}.{CONTAINER_EXTENSION}"))
}

/// Write `bytes` to `path` atomically.
///
/// Data goes to a temporary file beside `path` that is renamed into place
/// only once fully written, so a failure never leaves a partial container.
pub fn write_container(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::file(dir, e))?;
    tmp.write_all(bytes).map_err(|e| Error::file(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::file(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::file(path, e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote container");
    Ok(())
}
