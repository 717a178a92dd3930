//! ZIP unpacking into a course directory.

use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::FetchError;

/// Local file header / empty-archive signatures.
const ZIP_MAGIC: &[&[u8]] = &[b"PK\x03\x04", b"PK\x05\x06"];

/// True when `body` starts like a ZIP archive.
pub(crate) fn is_zip(body: &[u8]) -> bool {
    ZIP_MAGIC.iter().any(|magic| body.starts_with(magic))
}

/// Files written by one unpack.
#[derive(Debug, Default)]
pub(crate) struct Unpacked {
    pub written: usize,
    pub new_files: Vec<PathBuf>,
}

/// Unpacks `bytes` below `dest`, overwriting existing files. Entries whose
/// names would land outside `dest` are skipped.
pub(crate) fn unpack(bytes: &[u8], dest: &Path) -> Result<Unpacked, FetchError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut out = Unpacked::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            tracing::warn!("skipping archive entry with unsafe name {:?}", entry.name());
            continue;
        };
        let path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&path).map_err(|e| io_err(&path, e))?;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let is_new = !path.try_exists().map_err(|e| io_err(&path, e))?;
        let mut file = fs::File::create(&path).map_err(|e| io_err(&path, e))?;
        io::copy(&mut entry, &mut file).map_err(|e| io_err(&path, e))?;

        out.written += 1;
        if is_new {
            tracing::info!("New: {}", path.display());
            out.new_files.push(path);
        }
    }
    Ok(out)
}

fn io_err(path: &Path, source: io::Error) -> FetchError {
    FetchError::Io {
        path: path.to_path_buf(),
        source,
    }
}
