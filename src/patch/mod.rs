mod hash;
mod replace;
mod scan;

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;

use crate::config::load_settings;
use crate::error::GbeError;
use crate::paths::paths;
use crate::platform::{PlatformProfile, ProfileTable};
use crate::process::{ProcessRunner, SystemRunner, make_executable};
use crate::report::{LogReporter, Reporter};
use crate::steam::{StoreClient, configure_game, store_client};

pub use hash::hash_file;
pub use replace::{Replacement, replace_file};
pub use scan::find_targets;

/// Per-run tally of what happened to each discovered target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub found: usize,
    pub replaced: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Replaces Steam API binaries in a game tree with the cached GBE build.
pub struct PatchApplier<'a> {
    profiles: &'a ProfileTable,
    runner: &'a dyn ProcessRunner,
    reporter: &'a dyn Reporter,
    /// `strings` tool used to spot already-emulated binaries; `None` disables it.
    fork_check: Option<OsString>,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Replaced,
    UpToDate,
    Skipped,
}

impl<'a> PatchApplier<'a> {
    pub fn new(
        profiles: &'a ProfileTable,
        runner: &'a dyn ProcessRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        PatchApplier {
            profiles,
            runner,
            reporter,
            fork_check: None,
        }
    }

    pub fn with_fork_check(mut self, strings: impl Into<OsString>) -> Self {
        self.fork_check = Some(strings.into());
        self
    }

    /// Patch every copy of the platform's target binary under `search_root`.
    ///
    /// Steps:
    /// 1. Resolve `platform` in the profile table.
    /// 2. Walk `search_root` for files named like the profile's target.
    /// 3. Hash the cached source binary once.
    /// 4. For each target: skip when the digest matches, otherwise back up and
    ///    replace it, replace the companion next to it, then run the
    ///    interface generator in its directory.
    ///
    /// Only an unknown platform, a missing source, or a failed directory walk
    /// abort the run. Problems with individual targets are reported and the
    /// loop moves on.
    pub fn apply(&self, platform: &str, cache_root: &Path, search_root: &Path) -> Result<PatchReport> {
        let profile = self.profiles.get(platform)?;

        let targets = find_targets(search_root, &profile.target)?;
        if targets.is_empty() {
            self.reporter
                .warn(&format!("No target files found for platform '{platform}'."));
        }

        let source = profile.source_file(cache_root);
        if !source.is_file() {
            return Err(GbeError::MissingSource(source).into());
        }
        let source_hash = hash_file(&source).context("failed to get hash of source file")?;

        let mut report = PatchReport {
            found: targets.len(),
            ..PatchReport::default()
        };
        for target in &targets {
            self.reporter
                .info(&format!("Found potential target: '{}'", target.display()));
            match self.patch_one(profile, cache_root, &source, &source_hash, target) {
                Ok(Outcome::Replaced) => report.replaced += 1,
                Ok(Outcome::UpToDate) => report.up_to_date += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    self.reporter
                        .error(&format!("{}: {e:#}. Skipping.", target.display()));
                }
            }
        }

        self.reporter.success("GBE application process completed.");
        Ok(report)
    }

    fn patch_one(
        &self,
        profile: &PlatformProfile,
        cache_root: &Path,
        source: &Path,
        source_hash: &str,
        target: &Path,
    ) -> Result<Outcome> {
        let target_hash = hash_file(target).context("failed to get hash")?;
        if target_hash == source_hash {
            self.reporter
                .success("File is already up-to-date. Skipping.");
            return Ok(Outcome::UpToDate);
        }

        if self.is_existing_fork(target) {
            self.reporter.warn(&format!(
                "File '{}' appears to be an existing GBE fork. Skipping.",
                target.display()
            ));
            return Ok(Outcome::Skipped);
        }

        let r = replace_file(source, target).context("failed to replace file")?;
        self.report_replacement(source, target, &r);

        let dir = target.parent().unwrap_or(Path::new("."));
        if let (Some(name), Some(companion)) =
            (&profile.companion, profile.companion_file(cache_root))
            && companion.is_file()
        {
            let dest = dir.join(name);
            match replace_file(&companion, &dest) {
                Ok(r) => self.report_replacement(&companion, &dest, &r),
                Err(e) => self.reporter.warn(&format!(
                    "Failed to replace additional file '{}': {e:#}",
                    dest.display()
                )),
            }
        }

        let generator = profile.generator_path(cache_root);
        if generator.is_file() {
            self.run_generator(profile, &generator, target, dir);
        }

        Ok(Outcome::Replaced)
    }

    fn run_generator(&self, profile: &PlatformProfile, generator: &Path, target: &Path, dir: &Path) {
        self.reporter
            .info(&format!("Running generator '{}'...", profile.generator));
        if let Err(e) = make_executable(generator) {
            self.reporter.warn(&format!(
                "Failed to set executable permissions on '{}': {e:#}",
                generator.display()
            ));
        }
        let arg: OsString = target.file_name().unwrap_or_default().to_os_string();
        match self.runner.run(generator.as_os_str(), &[arg], Some(dir)) {
            Ok(out) if out.success => {}
            Ok(out) => self.reporter.error(&format!(
                "Generator failed (exit status: {})\nOutput: {}",
                out.status.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                out.output
            )),
            Err(e) => self.reporter.error(&format!("Generator failed: {e:#}")),
        }
    }

    fn is_existing_fork(&self, target: &Path) -> bool {
        let Some(strings) = &self.fork_check else {
            return false;
        };
        match self
            .runner
            .run(strings, &[target.as_os_str().to_os_string()], None)
        {
            Ok(out) => out.success && out.output.contains("gbe_fork"),
            Err(_) => false,
        }
    }

    fn report_replacement(&self, source: &Path, dest: &Path, r: &Replacement) {
        if let Some(b) = &r.backup {
            self.reporter.info(&format!(
                "Backed up '{}' to '{}'",
                dest.display(),
                b.display()
            ));
        }
        let how = if r.linked { "hard link" } else { "copy" };
        self.reporter
            .info(&format!("Replaced with '{}' ({how})", source.display()));
    }
}

/// CLI command: patch the game under `game_dir`, then write its Steam config.
pub fn cmd_apply(platform: &str, app_id: u32, game_dir: &Path) -> Result<()> {
    let p = paths()?;
    let settings = load_settings(&p.config)?;
    let profiles = ProfileTable::builtin();
    let runner = SystemRunner;
    let reporter = LogReporter;

    let mut applier = PatchApplier::new(&profiles, &runner, &reporter);
    if settings.detect_existing_fork {
        applier = applier.with_fork_check(&settings.strings);
    }
    let report = applier.apply(platform, &p.home, game_dir)?;
    reporter.info(&format!(
        "{} found: {} replaced, {} up-to-date, {} skipped, {} failed",
        report.found, report.replaced, report.up_to_date, report.skipped, report.failed
    ));

    let client = store_client()?;
    let store = StoreClient::new(&client, &settings.store_api_url, &settings.store_url);
    configure_game(&store, &reporter, app_id, game_dir)
}
