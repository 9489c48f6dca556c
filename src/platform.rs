use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::GbeError;
use crate::paths::{LINUX_RELEASE_DIR, WIN_RELEASE_DIR};

/// How one platform's Steam API binary is patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Release subdirectory inside the cache (`linux_release`, `win_release`).
    pub subdir: String,
    /// Binary searched for in the game tree and replaced.
    pub target: String,
    /// Binary shipped next to the target and replaced along with it.
    pub companion: Option<String>,
    /// Interface generator under `tools/generate_interfaces/`.
    pub generator: String,
    /// Bit width, selects `experimental/x64` or `experimental/x32`.
    pub arch: String,
}

impl PlatformProfile {
    fn new(subdir: &str, target: &str, companion: &str, generator: &str, arch: &str) -> Self {
        PlatformProfile {
            subdir: subdir.to_string(),
            target: target.to_string(),
            companion: Some(companion.to_string()).filter(|c| !c.is_empty()),
            generator: generator.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Directory holding the patched binaries for this profile.
    pub fn source_dir(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(&self.subdir)
            .join("experimental")
            .join(format!("x{}", self.arch))
    }

    pub fn source_file(&self, cache_root: &Path) -> PathBuf {
        self.source_dir(cache_root).join(&self.target)
    }

    pub fn companion_file(&self, cache_root: &Path) -> Option<PathBuf> {
        self.companion
            .as_ref()
            .map(|c| self.source_dir(cache_root).join(c))
    }

    pub fn generator_path(&self, cache_root: &Path) -> PathBuf {
        cache_root
            .join(&self.subdir)
            .join("tools")
            .join("generate_interfaces")
            .join(&self.generator)
    }
}

/// Immutable platform lookup, built once and handed to whoever needs it.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: BTreeMap<String, PlatformProfile>,
}

impl ProfileTable {
    pub fn new(profiles: impl IntoIterator<Item = (String, PlatformProfile)>) -> Self {
        ProfileTable {
            profiles: profiles.into_iter().collect(),
        }
    }

    /// The three platforms the GBE fork ships builds for.
    pub fn builtin() -> Self {
        Self::new([
            (
                "linux".to_string(),
                PlatformProfile::new(
                    LINUX_RELEASE_DIR,
                    "libsteam_api.so",
                    "steamclient.so",
                    "generate_interfaces_x64",
                    "64",
                ),
            ),
            (
                "win64".to_string(),
                PlatformProfile::new(
                    WIN_RELEASE_DIR,
                    "steam_api64.dll",
                    "steamclient64.dll",
                    "generate_interfaces_x64.exe",
                    "64",
                ),
            ),
            (
                "win32".to_string(),
                PlatformProfile::new(
                    WIN_RELEASE_DIR,
                    "steam_api.dll",
                    "steamclient.dll",
                    "generate_interfaces_x32.exe",
                    "32",
                ),
            ),
        ])
    }

    /// Exact-key lookup; unknown keys fail with the sorted list of valid ones.
    pub fn get(&self, platform: &str) -> Result<&PlatformProfile> {
        self.profiles.get(platform).ok_or_else(|| {
            GbeError::UnknownPlatform {
                name: platform.to_string(),
                valid: self.keys().map(str::to_string).collect(),
            }
            .into()
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_three_platforms() {
        let t = ProfileTable::builtin();
        assert_eq!(t.keys().collect::<Vec<_>>(), ["linux", "win32", "win64"]);
        assert_eq!(t.get("win32").unwrap().target, "steam_api.dll");
    }

    #[test]
    fn unknown_platform_is_typed_error() {
        let t = ProfileTable::builtin();
        let err = t.get("Linux").unwrap_err();
        match err.downcast_ref::<GbeError>() {
            Some(GbeError::UnknownPlatform { name, valid }) => {
                assert_eq!(name, "Linux");
                assert_eq!(valid, &["linux", "win32", "win64"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cache_paths_follow_release_layout() {
        let t = ProfileTable::builtin();
        let p = t.get("win32").unwrap();
        let root = Path::new("/c");
        assert_eq!(
            p.source_file(root),
            PathBuf::from("/c/win_release/experimental/x32/steam_api.dll")
        );
        assert_eq!(
            p.companion_file(root),
            Some(PathBuf::from("/c/win_release/experimental/x32/steamclient.dll"))
        );
        assert_eq!(
            p.generator_path(root),
            PathBuf::from("/c/win_release/tools/generate_interfaces/generate_interfaces_x32.exe")
        );
    }

    #[test]
    fn empty_companion_becomes_none() {
        let p = PlatformProfile::new("r", "t.so", "", "g", "64");
        assert!(p.companion.is_none());
        assert!(p.companion_file(Path::new("/c")).is_none());
    }
}
