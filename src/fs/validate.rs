//! Setup checks run before any byte is copied

use crate::error::{IoResultExt, PcopyError, Result};
use std::io::ErrorKind;
use std::fs::Metadata;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Check that `source` is a readable regular file and `dest` can be created
/// without clobbering it. Returns the source length.
pub fn validate_paths(source: &Path, dest: &Path) -> Result<u64> {
    let metadata = match std::fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PcopyError::NotFound(source.to_path_buf()));
        }
        Err(e) => return Err(PcopyError::io(source, e)),
    };

    if !metadata.is_file() {
        return Err(PcopyError::NotAFile(source.to_path_buf()));
    }

    if dest.is_dir() {
        return Err(PcopyError::NotAFile(dest.to_path_buf()));
    }

    if dest.exists() {
        let dest_metadata = std::fs::metadata(dest).with_path(dest)?;
        if same_inode(&metadata, &dest_metadata) {
            return Err(PcopyError::SameSourceAndDestination(dest.to_path_buf()));
        }
        let src_canonical = source.canonicalize().with_path(source)?;
        let dst_canonical = dest.canonicalize().with_path(dest)?;
        if src_canonical == dst_canonical {
            return Err(PcopyError::SameSourceAndDestination(src_canonical));
        }
    } else if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(PcopyError::NotFound(parent.to_path_buf()));
        }
    }

    Ok(metadata.len())
}

/// Hard links share a device and inode while having distinct paths.
#[cfg(unix)]
fn same_inode(a: &Metadata, b: &Metadata) -> bool {
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_inode(_a: &Metadata, _b: &Metadata) -> bool {
    false
}
