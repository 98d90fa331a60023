//! Single file copy: chunked streaming with cancellation.

use super::CopyRun;
use crate::error::{Error, Result, is_no_space_error};
use crate::utils::path::display_relative;
use std::io::{self, Read, Write};
use std::path::Path;

impl CopyRun<'_> {
    /// Stream `src` into `dst`, one chunk at a time.
    ///
    /// Both streams are dropped (closed) on every exit path. A cancellation
    /// observed between chunks leaves `dst` incomplete and returns
    /// [`Error::Cancelled`].
    pub(super) fn copy_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        self.check_cancelled()?;

        let total = self.fs.file_size(src);
        self.tracker
            .start_file(display_relative(&self.root, src), total);

        let mut reader = self.fs.open_read(src).map_err(|source| Error::Read {
            path: src.to_path_buf(),
            source,
        })?;
        let mut writer = self.fs.open_write(dst).map_err(|source| self.write_error(dst, source))?;

        let mut buf = vec![0u8; self.options.chunk_size];
        let mut copied: u64 = 0;
        loop {
            let len = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Read {
                        path: src.to_path_buf(),
                        source,
                    });
                }
            };
            // A chunk read after cancellation is dropped unwritten
            self.check_cancelled()?;

            writer
                .write_all(&buf[..len])
                .map_err(|source| self.write_error(dst, source))?;
            copied += len as u64;
            self.tracker.advance(len as u64);
        }

        writer
            .flush()
            .map_err(|source| self.write_error(dst, source))?;
        if self.options.fsync {
            writer
                .sync()
                .map_err(|source| self.write_error(dst, source))?;
        }
        drop(writer);
        drop(reader);

        if self.options.preserve_timestamps {
            if let Err(e) = self.fs.copy_times(src, dst) {
                self.options.warn(&format!(
                    "Failed to preserve timestamps on {}: {}",
                    dst.display(),
                    e
                ));
            }
        }

        self.stats.files_copied += 1;
        self.stats.bytes_copied += copied;
        self.options.verbose(&format!(
            "copied {} -> {} ({} bytes)",
            src.display(),
            dst.display(),
            copied
        ));
        Ok(())
    }

    fn write_error(&self, dst: &Path, source: io::Error) -> Error {
        if is_no_space_error(&source) {
            self.options
                .warn(&format!("Destination full while writing {}", dst.display()));
        }
        Error::Write {
            path: dst.to_path_buf(),
            source,
        }
    }
}
