//! Commit primitives
//!
//! The commit protocol needs two filesystem operations: write a new file,
//! then atomically replace the target with it. [`CommitSink`] isolates them
//! so a failure can be injected between the two.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Write-then-swap primitives used by a commit
pub trait CommitSink: Send + Sync {
    /// Write `bytes` to `temp`, replacing anything already there
    fn write_temp(&self, temp: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Atomically replace `target` with `temp`
    ///
    /// `temp` no longer exists afterwards.
    fn swap(&self, temp: &Path, target: &Path) -> io::Result<()>;
}

/// Filesystem sink: synced write followed by `rename`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCommitSink;

impl CommitSink for FsCommitSink {
    fn write_temp(&self, temp: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = temp.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(temp)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn swap(&self, temp: &Path, target: &Path) -> io::Result<()> {
        fs::rename(temp, target)
    }
}
