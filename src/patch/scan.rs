use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every regular file under `root` named exactly `file_name`.
///
/// Symlinks are not followed and are never reported. Results come back in
/// a stable, name-sorted walk order.
///
/// # Errors
/// Any directory that cannot be read aborts the walk.
pub fn find_targets(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to search {}", root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == file_name {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_nested_exact_matches_only() {
        let td = tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join("bin/x64")).unwrap();
        fs::create_dir_all(root.join("Game_Data/Plugins")).unwrap();
        fs::write(root.join("bin/x64/steam_api64.dll"), "a").unwrap();
        fs::write(root.join("Game_Data/Plugins/steam_api64.dll"), "b").unwrap();
        fs::write(root.join("bin/steam_api.dll"), "c").unwrap();
        fs::write(root.join("bin/x64/steam_api64.dll.20240101-000000.ORIGINAL"), "d").unwrap();

        let got = find_targets(root, "steam_api64.dll").unwrap();

        assert_eq!(
            got,
            vec![
                root.join("Game_Data/Plugins/steam_api64.dll"),
                root.join("bin/x64/steam_api64.dll"),
            ]
        );
    }

    #[test]
    fn directory_with_target_name_is_ignored() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("libsteam_api.so")).unwrap();
        assert!(find_targets(td.path(), "libsteam_api.so").unwrap().is_empty());
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let td = tempdir().unwrap();
        assert!(find_targets(td.path(), "steam_api.dll").unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let td = tempdir().unwrap();
        assert!(find_targets(&td.path().join("nope"), "steam_api.dll").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_targets_are_skipped() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("steam_api.dll"), "x").unwrap();
        let links = td.path().join("links");
        fs::create_dir_all(&links).unwrap();
        std::os::unix::fs::symlink(real.join("steam_api.dll"), links.join("steam_api.dll"))
            .unwrap();

        let got = find_targets(td.path(), "steam_api.dll").unwrap();
        assert_eq!(got, vec![real.join("steam_api.dll")]);
    }
}
