use anyhow::{Context, Result};
use std::{env, path::PathBuf};

/// Holds the `updated_at` of the release currently unpacked in the cache.
pub const MARKER_FILE: &str = ".gbe_timestamp";
/// Cache subdirectory for the Linux build.
pub const LINUX_RELEASE_DIR: &str = "linux_release";
/// Cache subdirectory for the Windows builds (32 and 64 bit share it).
pub const WIN_RELEASE_DIR: &str = "win_release";

/// Well-known locations inside the cache home.
#[derive(Clone, Debug)]
pub struct Paths {
    pub home: PathBuf,
    pub config: PathBuf,
}

/// Root of the local GBE cache.
///
/// `$GBE_HOME` wins when set; otherwise `<data dir>/gbe_fork`
/// (`~/.local/share/gbe_fork` on Linux).
pub fn gbe_home() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("GBE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().context("could not determine the user data directory")?;
    Ok(base.join("gbe_fork"))
}

pub fn paths() -> Result<Paths> {
    Ok(Paths::under(gbe_home()?))
}

impl Paths {
    pub fn under(home: PathBuf) -> Self {
        Paths {
            config: home.join("config.toml"),
            home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn gbe_home_honours_env_override() {
        let td = tempfile::tempdir().unwrap();
        unsafe { env::set_var("GBE_HOME", td.path()) };
        let got = gbe_home().unwrap();
        unsafe { env::remove_var("GBE_HOME") };
        assert_eq!(got, td.path());
    }

    #[test]
    #[serial]
    fn gbe_home_defaults_under_data_dir() {
        unsafe { env::remove_var("GBE_HOME") };
        let got = gbe_home().unwrap();
        assert!(got.ends_with("gbe_fork"));
    }

    #[test]
    fn config_lives_in_cache_home() {
        let p = Paths::under(PathBuf::from("/cache"));
        assert_eq!(p.home, PathBuf::from("/cache"));
        assert_eq!(p.config, PathBuf::from("/cache/config.toml"));
    }
}
