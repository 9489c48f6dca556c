mod archive;
mod github;
mod notes;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::load_settings;
use crate::error::GbeError;
use crate::paths::{LINUX_RELEASE_DIR, MARKER_FILE, Paths, WIN_RELEASE_DIR, paths};
use crate::process::SystemRunner;
use crate::report::{LogReporter, Reporter};

pub(crate) use archive::{ArchiveExtractor, ArchiveFormat};
pub(crate) use github::{fetch_release, github_client};

/// One platform family of the GBE fork release.
struct Group {
    label: &'static str,
    suffix: &'static str,
    subdir: &'static str,
}

/// Linux before Windows; both must succeed before the marker is written.
const GROUPS: [Group; 2] = [
    Group {
        label: "Linux",
        suffix: "linux-release.tar.bz2",
        subdir: LINUX_RELEASE_DIR,
    },
    Group {
        label: "Windows",
        suffix: "win-release.7z",
        subdir: WIN_RELEASE_DIR,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    AlreadyCurrent,
    Updated { updated_at: String },
}

/// Keeps the local GBE cache in step with the latest upstream release.
pub struct ReleaseFetcher<'a> {
    client: &'a Client,
    feed_url: &'a str,
    extractor: &'a ArchiveExtractor<'a>,
    reporter: &'a dyn Reporter,
}

impl<'a> ReleaseFetcher<'a> {
    pub fn new(
        client: &'a Client,
        feed_url: &'a str,
        extractor: &'a ArchiveExtractor<'a>,
        reporter: &'a dyn Reporter,
    ) -> Self {
        ReleaseFetcher {
            client,
            feed_url,
            extractor,
            reporter,
        }
    }

    /// Download and unpack the latest release unless the cache already has it.
    ///
    /// Process:
    /// 1. Fetch release metadata from the feed.
    /// 2. If `<cache_root>/.gbe_timestamp` holds exactly `updated_at`, stop.
    /// 3. Show the release notes, then find the Linux and Windows assets;
    ///    a missing one aborts before anything is downloaded.
    /// 4. Extract Linux then Windows into their cache subdirectories.
    /// 5. Write the marker only after both succeeded.
    pub fn update_if_stale(&self, cache_root: &Path) -> Result<UpdateOutcome> {
        self.reporter.info("Fetching latest GBE fork from GitHub...");
        let release = fetch_release(self.client, self.feed_url)?;

        let marker = cache_root.join(MARKER_FILE);
        if self.read_marker(&marker).as_deref() == Some(release.updated_at.as_str()) {
            self.reporter.success("GBE fork is already up-to-date.");
            return Ok(UpdateOutcome::AlreadyCurrent);
        }

        self.show_notes(&release.body);

        let mut downloads = Vec::with_capacity(GROUPS.len());
        for group in &GROUPS {
            let asset = release.asset_with_suffix(group.suffix).ok_or_else(|| {
                GbeError::DownloadUrlNotFound {
                    group: group.label.to_string(),
                }
            })?;
            let format = ArchiveFormat::from_file_name(&asset.name)?;
            downloads.push((asset.browser_download_url.as_str(), format));
        }

        fs::create_dir_all(cache_root)
            .with_context(|| format!("failed to create directory {}", cache_root.display()))?;

        for (group, (url, format)) in GROUPS.iter().zip(downloads) {
            self.reporter
                .info(&format!("Downloading {} release ({format})...", group.label));
            self.extractor
                .fetch_and_extract(url, &cache_root.join(group.subdir), format)
                .with_context(|| format!("failed to update {} release", group.label))?;
            self.reporter
                .success(&format!("{} release extracted.", group.label));
        }

        fs::write(&marker, &release.updated_at).context("failed to write timestamp file")?;
        self.reporter.success("GBE fork updated successfully.");
        Ok(UpdateOutcome::Updated {
            updated_at: release.updated_at,
        })
    }

    fn show_notes(&self, body: &str) {
        if body.trim().is_empty() {
            return;
        }
        match notes::render(body) {
            Ok(text) => self.reporter.display(&text),
            Err(e) => self
                .reporter
                .warn(&format!("Error rendering release notes: {e:#}")),
        }
    }

    /// Installed `updated_at`, or `None` when the marker is absent or unreadable.
    fn read_marker(&self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                self.reporter.warn(&format!(
                    "Could not read {}: {e}. Treating cache as stale.",
                    path.display()
                ));
                None
            }
        }
    }
}

/// CLI command: refresh the cached GBE fork release.
pub fn cmd_update() -> Result<()> {
    let p: Paths = paths()?;
    let settings = load_settings(&p.config)?;
    let client = github_client()?;
    let runner = SystemRunner;
    let reporter = LogReporter;
    let extractor = ArchiveExtractor::new(&client, &runner, &reporter, &settings.seven_zip);
    let outcome = ReleaseFetcher::new(&client, &settings.release_url, &extractor, &reporter)
        .update_if_stale(&p.home)?;
    if let UpdateOutcome::Updated { updated_at } = outcome {
        reporter.info(&format!("Cache now holds the release from {updated_at}."));
    }
    Ok(())
}
