//! Per-game emulator configuration from the Steam storefront.

mod game_config;
mod store;

use anyhow::Result;
use std::path::Path;

use crate::config::load_settings;
use crate::paths::paths;
use crate::report::{LogReporter, Reporter};

pub use game_config::{write_app_id, write_dlc_config};
pub use store::{StoreClient, store_client};

/// Write `steam_appid.txt` and the DLC list for `app_id` into `game_dir`.
///
/// DLCs whose name cannot be resolved are left out with a warning. When the
/// store lists no DLCs at all, only the app id file is written.
pub fn configure_game(
    store: &StoreClient<'_>,
    reporter: &dyn Reporter,
    app_id: u32,
    game_dir: &Path,
) -> Result<()> {
    reporter.info(&format!(
        "Fetching DLCs for AppID {app_id} in library path {}...",
        game_dir.display()
    ));

    let id_file = write_app_id(game_dir, app_id)?;
    reporter.info(&format!(
        "Wrote steam_appid.txt with AppID {app_id} to {}",
        id_file.display()
    ));

    let ids = store.dlc_ids(app_id)?;
    if ids.is_empty() {
        reporter.warn(&format!("No DLCs found for AppID {app_id}."));
        return Ok(());
    }

    let mut dlcs = Vec::with_capacity(ids.len());
    for id in ids {
        match store.app_name(id) {
            Ok(name) => dlcs.push((id, name)),
            Err(e) => reporter.warn(&format!("Failed to get name for DLC {id}: {e:#}")),
        }
    }

    let ini = write_dlc_config(game_dir, &dlcs)?;
    reporter.info(&format!("Wrote DLC configuration to {}", ini.display()));
    Ok(())
}

/// CLI command: write the per-game Steam configuration for `app_id`.
pub fn cmd_dlc(app_id: u32, game_dir: &Path) -> Result<()> {
    let p = paths()?;
    let settings = load_settings(&p.config)?;
    let client = store_client()?;
    let store = StoreClient::new(&client, &settings.store_api_url, &settings.store_url);
    configure_game(&store, &LogReporter, app_id, game_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::{Level, RecordingReporter};
    use httpmock::prelude::*;
    use reqwest::blocking::Client;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_app_id_and_named_dlcs() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/dlc/480/random/ajaxgetfilteredrecommendations/");
            then.status(200).body(
                r#"{"results_html":"<a data-ds-appid=\"12\"><a data-ds-appid=\"11\"><a data-ds-appid=\"12\">"}"#,
            );
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/appdetails").query_param("appids", "11");
            then.status(200)
                .json_body(json!({"11": {"success": true, "data": {"name": "Art Book"}}}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/appdetails").query_param("appids", "12");
            then.status(500);
        });

        let td = tempdir().unwrap();
        let client = Client::new();
        let store = StoreClient::new(&client, &server.url("/api"), &server.base_url());
        let rep = RecordingReporter::new();
        configure_game(&store, &rep, 480, td.path()).unwrap();

        assert_eq!(fs::read_to_string(td.path().join("steam_appid.txt")).unwrap(), "480");
        assert_eq!(
            fs::read_to_string(td.path().join("steam_settings/configs.app.ini")).unwrap(),
            "[app::dlcs]\nunlock_all=0\n11=Art Book\n"
        );
        assert!(rep.contains(Level::Warn, "DLC 12"));
    }

    #[test]
    fn no_dlcs_writes_only_app_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/dlc/70/random/ajaxgetfilteredrecommendations/");
            then.status(200).body(r#"{"results_html":""}"#);
        });

        let td = tempdir().unwrap();
        let client = Client::new();
        let store = StoreClient::new(&client, &server.url("/api"), &server.base_url());
        let rep = RecordingReporter::new();
        configure_game(&store, &rep, 70, td.path()).unwrap();

        assert!(td.path().join("steam_appid.txt").is_file());
        assert!(!td.path().join("steam_settings").exists());
        assert!(rep.contains(Level::Warn, "No DLCs found for AppID 70"));
    }
}
