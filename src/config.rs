use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const RELEASE_FEED_URL: &str =
    "https://api.github.com/repos/Detanup01/gbe_fork/releases/latest";
pub const STORE_API_URL: &str = "https://store.steampowered.com/api";
pub const STORE_URL: &str = "https://store.steampowered.com";
pub const SEVEN_ZIP_COMMAND: &str = "7z";
pub const STRINGS_COMMAND: &str = "strings";

/// Tool settings, optionally overridden by `config.toml` in the cache home.
///
/// Every key is optional:
/// ```toml
/// release_url = "https://api.github.com/repos/Detanup01/gbe_fork/releases/latest"
/// seven_zip = "7zz"
/// detect_existing_fork = true
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub release_url: String,
    pub store_api_url: String,
    pub store_url: String,
    pub seven_zip: String,
    pub strings: String,
    /// Skip targets whose embedded strings already mention `gbe_fork`.
    pub detect_existing_fork: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            release_url: RELEASE_FEED_URL.to_string(),
            store_api_url: STORE_API_URL.to_string(),
            store_url: STORE_URL.to_string(),
            seven_zip: SEVEN_ZIP_COMMAND.to_string(),
            strings: STRINGS_COMMAND.to_string(),
            detect_existing_fork: false,
        }
    }
}

/// Load settings from `path`, falling back to defaults when the file is absent.
///
/// # Errors
/// - The file exists but cannot be read.
/// - The file is not valid TOML for [`Settings`].
pub fn load_settings(path: &Path) -> Result<Settings> {
    let txt = match fs::read_to_string(path) {
        Ok(txt) => txt,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let settings: Settings =
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let td = tempdir().unwrap();
        let s = load_settings(&td.path().join("config.toml")).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.seven_zip, "7z");
        assert!(!s.detect_existing_fork);
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.toml");
        fs::write(&p, "seven_zip = \"7zz\"\ndetect_existing_fork = true\n").unwrap();
        let s = load_settings(&p).unwrap();
        assert_eq!(s.seven_zip, "7zz");
        assert!(s.detect_existing_fork);
        assert_eq!(s.release_url, RELEASE_FEED_URL);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.toml");
        fs::write(&p, "seven_zip = [").unwrap();
        let err = load_settings(&p).unwrap_err();
        assert!(format!("{err}").contains("config.toml"));
    }
}
