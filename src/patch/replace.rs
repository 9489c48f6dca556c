use anyhow::{Context, Result};
use chrono::Local;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What [`replace_file`] did to the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Where the previous destination was moved, if there was one.
    pub backup: Option<PathBuf>,
    /// `true` when `dest` is a hard link to the source, `false` for a copy.
    pub linked: bool,
}

/// Back up `dest` (if present) and put `src` in its place.
///
/// The old file is renamed to `<dest>.<YYYYMMDD-HHMMSS>.ORIGINAL` before
/// anything else happens. The new file is a hard link to `src` when the
/// filesystem allows it and a full copy otherwise.
///
/// # Errors
/// - `dest` cannot be inspected or renamed (nothing has changed yet).
/// - Neither linking nor copying succeeds; the backup is left in place and
///   its path is part of the error message.
pub fn replace_file(src: &Path, dest: &Path) -> Result<Replacement> {
    let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    replace_with_stamp(src, dest, &stamp)
}

pub(crate) fn replace_with_stamp(src: &Path, dest: &Path, stamp: &str) -> Result<Replacement> {
    let backup = match fs::symlink_metadata(dest) {
        Ok(_) => {
            let backup = free_backup_path(dest, stamp);
            fs::rename(dest, &backup).with_context(|| {
                format!("failed to backup {} to {}", dest.display(), backup.display())
            })?;
            Some(backup)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("failed to stat {}", dest.display()));
        }
    };

    let linked = match fs::hard_link(src, dest) {
        Ok(()) => true,
        Err(_) => {
            fs::copy(src, dest).with_context(|| match &backup {
                Some(b) => format!(
                    "failed to copy {} to {} (original kept at {})",
                    src.display(),
                    dest.display(),
                    b.display()
                ),
                None => format!("failed to copy {} to {}", src.display(), dest.display()),
            })?;
            false
        }
    };

    Ok(Replacement { backup, linked })
}

/// `<dest>.<stamp>.ORIGINAL`, or `<dest>.<stamp>-<n>.ORIGINAL` when a backup
/// from the same second already exists.
fn free_backup_path(dest: &Path, stamp: &str) -> PathBuf {
    let with_suffix = |suffix: String| {
        let mut s: OsString = dest.as_os_str().to_os_string();
        s.push(suffix);
        PathBuf::from(s)
    };
    let first = with_suffix(format!(".{stamp}.ORIGINAL"));
    if fs::symlink_metadata(&first).is_err() {
        return first;
    }
    (2u32..)
        .map(|n| with_suffix(format!(".{stamp}-{n}.ORIGINAL")))
        .find(|p| fs::symlink_metadata(p).is_err())
        .unwrap_or(first)
}
