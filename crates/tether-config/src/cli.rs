//! Command-line argument parsing for the tether server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tether server command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "tether-server", about = "Tether world-sync server")]
pub struct CliArgs {
    /// Listen address.
    #[arg(long)]
    pub bind: Option<String>,

    /// Listen port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum number of connected players.
    #[arg(long)]
    pub max_players: Option<u32>,

    /// Server tick rate in Hz.
    #[arg(long)]
    pub tick_rate: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref bind) = args.bind {
            self.server.bind_address = bind.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(max_players) = args.max_players {
            self.server.max_players = max_players;
        }
        if let Some(tick_rate) = args.tick_rate {
            self.server.tick_rate = tick_rate;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
