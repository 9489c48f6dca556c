//! # gbeh
//!
//! Command-line front end:
//! - `gbeh update` downloads the latest GBE fork release into the cache
//! - `gbeh apply <platform> <appid>` patches the game in the current directory
//! - `gbeh dlc <appid>` only writes the per-game Steam settings
//! - `gbeh home` prints the cache directory
//! - `gbeh version` prints the tool version

use anyhow::Result;
use clap::{Parser, Subcommand};
use gbeh::{cmd_apply, cmd_dlc, cmd_update, gbe_home};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gbeh",
    version,
    about = "gbeh - install and apply the GBE fork Steam emulator",
    arg_required_else_help = true
)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Replace Steam API binaries with the GBE fork and write the game's Steam config
    Apply {
        /// Target platform: linux, win64 or win32
        platform: String,
        /// Steam AppID of the game
        appid: u32,
        /// Game directory to search
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Download the latest GBE fork release if the cache is stale
    Update,
    /// Write steam_appid.txt and the DLC list for a game
    Dlc {
        /// Steam AppID of the game
        appid: u32,
        /// Game directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Print the cache directory
    Home,
    /// Print the version
    Version,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Cmd::Apply {
            platform,
            appid,
            dir,
        } => cmd_apply(&platform, appid, &dir),
        Cmd::Update => cmd_update(),
        Cmd::Dlc { appid, dir } => cmd_dlc(appid, &dir),
        Cmd::Home => {
            println!("{}", gbe_home()?.display());
            Ok(())
        }
        Cmd::Version => {
            println!("gbeh {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
