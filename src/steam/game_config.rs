use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_ID_FILE: &str = "steam_appid.txt";
pub const SETTINGS_DIR: &str = "steam_settings";
pub const APP_INI_FILE: &str = "configs.app.ini";

/// Write `steam_appid.txt` containing just the numeric id.
pub fn write_app_id(game_dir: &Path, app_id: u32) -> Result<PathBuf> {
    let path = game_dir.join(APP_ID_FILE);
    fs::write(&path, app_id.to_string())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write `steam_settings/configs.app.ini` listing the given DLCs.
pub fn write_dlc_config(game_dir: &Path, dlcs: &[(u32, String)]) -> Result<PathBuf> {
    let dir = game_dir.join(SETTINGS_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(APP_INI_FILE);
    fs::write(&path, render_dlc_ini(dlcs))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub fn render_dlc_ini(dlcs: &[(u32, String)]) -> String {
    let mut s = String::from("[app::dlcs]\nunlock_all=0\n");
    for (id, name) in dlcs {
        let _ = writeln!(s, "{id}={name}");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn app_id_file_has_bare_number() {
        let td = tempdir().unwrap();
        let p = write_app_id(td.path(), 480).unwrap();
        assert_eq!(fs::read_to_string(p).unwrap(), "480");
    }

    #[test]
    fn ini_lists_dlcs_under_section() {
        let td = tempdir().unwrap();
        let p = write_dlc_config(
            td.path(),
            &[(1001, "Soundtrack".into()), (1002, "Season Pass".into())],
        )
        .unwrap();
        assert!(p.ends_with("steam_settings/configs.app.ini"));
        assert_eq!(
            fs::read_to_string(p).unwrap(),
            "[app::dlcs]\nunlock_all=0\n1001=Soundtrack\n1002=Season Pass\n"
        );
    }
}
