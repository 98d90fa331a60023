//! Filesystem capability consumed by the scanner and the copier.
//!
//! The core never calls `std::fs` directly: everything goes through
//! [`FileSystem`], so the session logic can run against the local disk
//! ([`LocalFs`]) or any other tree that can be listed and streamed.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Readable stream returned by [`FileSystem::open_read`].
pub type ReadStream = Box<dyn Read + Send>;

/// Writable stream returned by [`FileSystem::open_write`].
///
/// Dropping the stream closes it; close failures are not observable.
pub trait WriteStream: Write + Send {
    /// Flush written data to durable storage.
    fn sync(&mut self) -> io::Result<()>;
}

impl WriteStream for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Operations the copy pipeline needs from a storage backend.
pub trait FileSystem: Send + Sync {
    /// Whether `path` is a regular file (symlinks are followed).
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` is a directory (symlinks are followed).
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Size of the file at `path`, or 0 when it cannot be read.
    fn file_size(&self, path: &Path) -> u64;

    /// Children of the directory at `path`, sorted by name.
    ///
    /// Fails when `path` is not a directory or cannot be listed.
    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create a single directory (the parent must exist).
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Open `path` for reading.
    fn open_read(&self, path: &Path) -> io::Result<ReadStream>;

    /// Create or truncate `path` for writing.
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn WriteStream>>;

    /// Free bytes usable on the volume containing `volume_root`.
    fn available_bytes(&self, volume_root: &Path) -> io::Result<u64>;

    /// Identity of the directory at `path`, used to detect cycles.
    ///
    /// Backends without a notion of identity return `None`, which disables
    /// cycle detection.
    fn dir_key(&self, _path: &Path) -> Option<(u64, u64)> {
        None
    }

    /// Copy modification and access times from `src` to `dst`.
    fn copy_times(&self, _src: &Path, _dst: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// [`FileSystem`] over the local disk.
///
/// # Example
///
/// ```no_run
/// use fitcopy::{FileSystem, LocalFs};
/// use std::path::Path;
///
/// // Never report more than 1 GiB free, even on a larger volume
/// let fs = LocalFs::new().with_quota(1 << 30);
/// let free = fs.available_bytes(Path::new("/mnt/card"))?;
/// assert!(free <= 1 << 30);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs {
    quota: Option<u64>,
}

impl LocalFs {
    /// Local filesystem reporting the real free space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the reported free space at `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// The configured cap, if any.
    #[must_use]
    pub fn quota(&self) -> Option<u64> {
        self.quota
    }
}

impl FileSystem for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn file_size(&self, path: &Path) -> u64 {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();
        Ok(children)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<ReadStream> {
        Ok(Box::new(File::open(path)?))
    }

    fn open_write(&self, path: &Path) -> io::Result<Box<dyn WriteStream>> {
        Ok(Box::new(File::create(path)?))
    }

    fn available_bytes(&self, volume_root: &Path) -> io::Result<u64> {
        let free = volume_free_bytes(volume_root)?;
        Ok(self.quota.map_or(free, |quota| free.min(quota)))
    }

    fn dir_key(&self, path: &Path) -> Option<(u64, u64)> {
        get_dir_key(path).ok()
    }

    fn copy_times(&self, src: &Path, dst: &Path) -> io::Result<()> {
        use filetime::{FileTime, set_file_times};
        let meta = fs::metadata(src)?;
        let mtime = FileTime::from_last_modification_time(&meta);
        let atime = FileTime::from_last_access_time(&meta);
        set_file_times(dst, atime, mtime)
    }
}

/// Free space via statvfs(3): blocks available to unprivileged users.
#[cfg(unix)]
fn volume_free_bytes(volume_root: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path = CString::new(volume_root.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // SAFETY: statvfs is plain old data and fully written on success
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(path.as_ptr(), &mut stat) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    #[allow(clippy::unnecessary_cast)]
    let free = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
    Ok(free)
}

#[cfg(windows)]
fn volume_free_bytes(volume_root: &Path) -> io::Result<u64> {
    use windows::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;
    use windows::core::HSTRING;

    let path = HSTRING::from(volume_root.as_os_str());
    let mut free_to_caller: u64 = 0;
    // SAFETY: the out pointer is valid for the duration of the call
    unsafe { GetDiskFreeSpaceExW(&path, Some(&mut free_to_caller), None, None) }
        .map_err(io::Error::other)?;
    Ok(free_to_caller)
}

#[cfg(not(any(unix, windows)))]
fn volume_free_bytes(_volume_root: &Path) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Free space query not supported on this platform",
    ))
}

/// Get a unique key for a directory based on device and inode.
///
/// On non-Unix platforms, falls back to a hash of the canonical path.
#[cfg(unix)]
fn get_dir_key(path: &Path) -> io::Result<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path)?;
    Ok((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn get_dir_key(path: &Path) -> io::Result<(u64, u64)> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = path.canonicalize()?;
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok((0, hasher.finish()))
}
