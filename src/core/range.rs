//! Single-range copy
//!
//! The unit of work handed to each worker: move the bytes of one half-open
//! span from source to destination in block-sized chunks.

use crate::core::io::{ReadAt, WriteAt};
use crate::error::{PcopyError, Result};
use crate::progress::ProgressReporter;
use std::io;
use std::path::Path;

/// Copies byte spans between two positioned handles
pub struct RangeCopier<'a, R: ?Sized, W: ?Sized> {
    source: &'a R,
    source_path: &'a Path,
    dest: &'a W,
    dest_path: &'a Path,
    block_size: u64,
    progress: Option<&'a ProgressReporter>,
}

impl<'a, R, W> RangeCopier<'a, R, W>
where
    R: ReadAt + ?Sized,
    W: WriteAt + ?Sized,
{
    /// Create a copier; paths are only used for error context
    pub fn new(
        source: &'a R,
        source_path: &'a Path,
        dest: &'a W,
        dest_path: &'a Path,
        block_size: u64,
    ) -> Self {
        Self {
            source,
            source_path,
            dest,
            dest_path,
            block_size: block_size.max(1),
            progress: None,
        }
    }

    /// Report copied bytes to a progress reporter
    pub fn with_progress(mut self, progress: Option<&'a ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Copy `[start_byte, end_byte)` and return the number of bytes moved.
    ///
    /// Each read asks for at most one block and never crosses `end_byte`;
    /// whatever a read returns is written unchanged at the same offset.
    pub fn copy_range(&self, start_byte: u64, end_byte: u64) -> Result<u64> {
        if end_byte <= start_byte {
            return Ok(0);
        }

        let buf_len = self.block_size.min(end_byte - start_byte) as usize;
        let mut buffer = vec![0u8; buf_len];
        let mut offset = start_byte;

        while offset < end_byte {
            let want = (end_byte - offset).min(buf_len as u64) as usize;
            let read = self.read_chunk(&mut buffer[..want], offset)?;

            self.dest
                .write_all_at(&buffer[..read], offset)
                .map_err(|e| PcopyError::write(self.dest_path, offset, e))?;

            if let Some(progress) = self.progress {
                progress.increment_bytes(read as u64);
            }
            offset += read as u64;
        }

        Ok(end_byte - start_byte)
    }

    fn read_chunk(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        loop {
            match self.source.read_at(buf, offset) {
                Ok(0) => {
                    return Err(PcopyError::read(
                        self.source_path,
                        offset,
                        io::Error::new(io::ErrorKind::UnexpectedEof, "source ended before range end"),
                    ));
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(PcopyError::read(self.source_path, offset, e)),
            }
        }
    }
}
