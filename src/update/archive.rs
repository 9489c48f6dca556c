use anyhow::{Context, Result};
use bzip2::read::BzDecoder;
use reqwest::blocking::Client;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::error::GbeError;
use crate::process::{ProcessRunner, run_checked};
use crate::report::Reporter;

/// The two archive kinds the GBE fork publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// bzip2-compressed tarball (Linux builds).
    TarBz2,
    /// 7-Zip archive (Windows builds), unpacked by an external archiver.
    SevenZip,
}

impl ArchiveFormat {
    /// Pick the format from a release asset's file extension.
    pub fn from_file_name(name: &str) -> Result<Self, GbeError> {
        if name.ends_with(".tar.bz2") {
            Ok(ArchiveFormat::TarBz2)
        } else if name.ends_with(".7z") {
            Ok(ArchiveFormat::SevenZip)
        } else {
            Err(GbeError::UnsupportedFormat(name.to_string()))
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::SevenZip => "7z",
        })
    }
}

/// Downloads release archives and unpacks them into a clean directory.
pub struct ArchiveExtractor<'a> {
    client: &'a Client,
    runner: &'a dyn ProcessRunner,
    reporter: &'a dyn Reporter,
    seven_zip: OsString,
}

impl<'a> ArchiveExtractor<'a> {
    pub fn new(
        client: &'a Client,
        runner: &'a dyn ProcessRunner,
        reporter: &'a dyn Reporter,
        seven_zip: impl Into<OsString>,
    ) -> Self {
        ArchiveExtractor {
            client,
            runner,
            reporter,
            seven_zip: seven_zip.into(),
        }
    }

    /// Fetch `url` and unpack it into `dest`, replacing whatever was there.
    ///
    /// `dest` is emptied only once the server has answered, so a failed
    /// request leaves the previous tree untouched.
    pub fn fetch_and_extract(&self, url: &str, dest: &Path, format: ArchiveFormat) -> Result<()> {
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to download {url}"))?;

        reset_dir(dest)?;

        match format {
            ArchiveFormat::TarBz2 => self.extract_tar_bz2(resp, dest),
            ArchiveFormat::SevenZip => self.extract_7z(resp, dest),
        }
    }

    /// Stream a bzip2 tarball into `dest`, then hoist a lone top-level folder.
    pub fn extract_tar_bz2(&self, reader: impl Read, dest: &Path) -> Result<()> {
        let mut ar = tar::Archive::new(BzDecoder::new(reader));
        ar.set_preserve_permissions(true);
        let entries = ar.entries().context("failed to read tar.bz2 stream")?;
        for entry in entries {
            let mut e = entry.context("malformed tar.bz2 entry")?;
            let name = e.path().map(|p| p.display().to_string()).unwrap_or_default();
            let inside = e
                .unpack_in(dest)
                .with_context(|| format!("failed to extract {name}"))?;
            if !inside {
                self.reporter
                    .warn(&format!("Skipped archive entry outside destination: '{name}'"));
            }
        }

        if let Some(nested) = single_subdir(dest)? {
            self.reporter.info(&format!(
                "Found single nested directory '{}'. Moving contents up.",
                nested.display()
            ));
            hoist(&nested, dest)?;
            self.reporter.success("Nested directory contents moved up.");
        }
        Ok(())
    }

    /// Spool a 7z archive to disk, run the archiver on it, then hoist `release/`.
    pub fn extract_7z(&self, mut reader: impl Read, dest: &Path) -> Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix("gbe-")
            .suffix(".7z")
            .tempfile()
            .context("failed to create temporary archive file")?;
        io::copy(&mut reader, tmp.as_file_mut()).context("failed to download 7z archive")?;

        let mut out_arg = OsString::from("-o");
        out_arg.push(dest.as_os_str());
        let args = [
            OsString::from("x"),
            tmp.path().as_os_str().to_os_string(),
            out_arg,
            OsString::from("-y"),
        ];
        run_checked(self.runner, OsStr::new(&self.seven_zip), &args, None)
            .context("failed to extract 7z archive")?;
        drop(tmp);

        let release = dest.join("release");
        if release.is_dir() {
            hoist(&release, dest)?;
        }
        Ok(())
    }
}

/// Remove `dir` with all its contents and create it again, empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("failed to clear {}", dir.display())),
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

/// The only entry of `dir`, if there is exactly one and it is a directory.
fn single_subdir(dir: &Path) -> Result<Option<std::path::PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read {}", dir.display()))?;
    if entries.len() != 1 {
        return Ok(None);
    }
    let only = entries.remove(0);
    let is_dir = only.file_type().map(|t| t.is_dir()).unwrap_or(false);
    Ok(is_dir.then(|| only.path()))
}

/// Move every child of `nested` into `parent` and remove `nested`.
///
/// `nested` is first renamed to a scratch name so a child sharing its name
/// (`pkg/pkg`) does not collide with it.
fn hoist(nested: &Path, parent: &Path) -> Result<()> {
    let scratch = (0u32..)
        .map(|n| parent.join(format!(".gbeh-hoist-{n}")))
        .find(|p| fs::symlink_metadata(p).is_err())
        .unwrap_or_else(|| parent.join(".gbeh-hoist"));
    fs::rename(nested, &scratch).with_context(|| {
        format!("failed to move '{}' aside", nested.display())
    })?;

    let entries = fs::read_dir(&scratch)
        .with_context(|| format!("failed to read nested directory '{}'", nested.display()))?;
    for entry in entries {
        let entry = entry?;
        let from = entry.path();
        let to = parent.join(entry.file_name());
        fs::rename(&from, &to).with_context(|| {
            format!("failed to move '{}' to '{}'", from.display(), to.display())
        })?;
    }
    fs::remove_dir(&scratch).with_context(|| {
        format!("failed to remove empty nested directory '{}'", nested.display())
    })?;
    Ok(())
}
