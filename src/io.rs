use std::{
    fs::{File, FileTimes},
    io::Write,
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::result::{Error, Result};

/// Files smaller than this are considered malformed downloads
pub const MIN_VALID_SIZE: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCheck {
    Missing,
    Undersized(u64),
    Valid(u64),
}

/// Check that a regular file exists at the path and is large enough
pub fn check_file(path: &Path) -> FileCheck {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            if meta.len() >= MIN_VALID_SIZE {
                FileCheck::Valid(meta.len())
            } else {
                FileCheck::Undersized(meta.len())
            }
        }
        _ => FileCheck::Missing,
    }
}

/// Create the directory and its parents if needed.
///
/// Fails if something which is not a directory is already there.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(path.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            std::fs::create_dir_all(path)?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Write the bytes to the path through a temporary file in the same directory,
/// so that an interrupted write never leaves a truncated video behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = tempfile::Builder::new()
        .prefix(".riptok-")
        .suffix(".part")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

pub fn purge(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path)
}

/// Set both the access and modification times of the file
pub fn set_file_times(path: &Path, timestamp: i64) -> std::io::Result<()> {
    let time = epoch_to_system_time(timestamp);
    let times = FileTimes::new().set_accessed(time).set_modified(time);

    File::options().write(true).open(path)?.set_times(times)
}

fn epoch_to_system_time(timestamp: i64) -> SystemTime {
    let offset = Duration::from_secs(timestamp.unsigned_abs());
    if timestamp >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    }
}
