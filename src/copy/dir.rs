//! Directory recursion for the copy phase.

use super::CopyRun;
use crate::error::{Error, Result};
use std::path::Path;

impl CopyRun<'_> {
    /// Copy one source entry, file or directory, to `dst`.
    pub(super) fn copy_entry(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if !self.fs.exists(src) {
            return Err(Error::SourceNotFound(src.to_path_buf()));
        }
        if self.fs.is_file(src) {
            self.copy_file(src, dst)
        } else {
            self.copy_folder(src, dst)
        }
    }

    /// Mirror the directory `src` at `dst`, children in listing order.
    ///
    /// `dst` is created if missing; an existing directory is merged into.
    fn copy_folder(&mut self, src: &Path, dst: &Path) -> Result<()> {
        let children = self.fs.list_children(src).map_err(|source| Error::Read {
            path: src.to_path_buf(),
            source,
        })?;

        let key = self.fs.dir_key(src);
        if let Some(key) = key {
            if self.ancestors.contains(&key) {
                return Err(Error::SymlinkLoop(src.to_path_buf()));
            }
        }

        if !self.fs.exists(dst) {
            self.fs
                .create_dir(dst)
                .map_err(|source| Error::CreateDir {
                    path: dst.to_path_buf(),
                    source,
                })?;
            self.stats.dirs_created += 1;
            self.options
                .verbose(&format!("created {}", dst.display()));
        }

        if let Some(key) = key {
            self.ancestors.push(key);
        }
        let result = self.copy_children(&children, dst);
        if key.is_some() {
            self.ancestors.pop();
        }
        result
    }

    fn copy_children(&mut self, children: &[std::path::PathBuf], dst: &Path) -> Result<()> {
        for child in children {
            self.check_cancelled()?;
            let Some(name) = child.file_name() else {
                continue;
            };
            // Dangling links, sockets and FIFOs count as 0 in the scan
            if !self.fs.is_file(child) && !self.fs.is_dir(child) {
                self.options.warn(&format!(
                    "Skipping {}: not a regular file or directory",
                    child.display()
                ));
                continue;
            }
            self.copy_entry(child, &dst.join(name))?;
        }
        Ok(())
    }
}
