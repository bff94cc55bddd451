//! I/O helper utilities for the mover.
//! Enriches io::Error with actionable context/hints and provides the byte
//! comparison backing the staged-destination check.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;

use anyhow::anyhow;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    #[cfg(unix)]
    if let Some(code) = e.raw_os_error() {
        match code {
            libc::EACCES | libc::EPERM => {
                msg.push_str(" — permission denied; check ownership and write permissions.");
            }
            libc::EXDEV => {
                msg.push_str(" — cross-filesystem; atomic rename not possible.");
            }
            libc::EBUSY => {
                msg.push_str(" — resource busy; ensure no other process is writing.");
            }
            libc::ENOENT => {
                msg.push_str(" — path not found; verify it exists.");
            }
            libc::EEXIST => {
                msg.push_str(" — already exists; remove the target first.");
            }
            libc::ENOSPC => {
                msg.push_str(" — insufficient space on device.");
            }
            libc::EROFS => {
                msg.push_str(" — read-only filesystem; cannot write here.");
            }
            _ => {}
        }
        msg.push_str(&format!(" [os code: {}]", code));
        return msg;
    }

    // Kind-based hints when no raw OS code is available (and on non-Unix).
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            msg.push_str(" — permission denied; check ownership and write permissions.");
        }
        io::ErrorKind::NotFound => {
            msg.push_str(" — path not found; verify it exists.");
        }
        io::ErrorKind::AlreadyExists => {
            msg.push_str(" — already exists; remove the target first.");
        }
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            msg.push_str(" — busy/timed out; retry after the current write finishes.");
        }
        _ => {}
    }
    msg
}

/// Adapter for anyhow::Result code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> anyhow::Error.
pub(crate) fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Whether two files hold identical bytes. Length is compared first as a
/// cheap reject, then contents are streamed in chunks. Metadata or read
/// errors count as a mismatch; the caller treats mismatches conservatively.
pub(crate) fn same_content(a: &Path, b: &Path) -> bool {
    let len = match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) if ma.len() == mb.len() => ma.len(),
        _ => return false,
    };

    let (mut fa, mut fb) = match (fs::File::open(a), fs::File::open(b)) {
        (Ok(fa), Ok(fb)) => (fa, fb),
        _ => return false,
    };

    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(buf_a.len() as u64) as usize;
        if fa.read_exact(&mut buf_a[..chunk]).is_err()
            || fb.read_exact(&mut buf_b[..chunk]).is_err()
        {
            return false;
        }
        if buf_a[..chunk] != buf_b[..chunk] {
            return false;
        }
        remaining -= chunk as u64;
    }
    true
}
