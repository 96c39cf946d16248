//! Headless server runner: config, logging, and the fixed tick loop.
//!
//! Transport is attached at the process boundary: inbound events are
//! published into [`SyncServer::bus`], outbound messages drain from the
//! channel. Until a transport claims the receiver, a background thread
//! trace-logs and discards outbound traffic.

use std::time::Duration;

use clap::Parser;
use tracing::{error, info, trace};

use tether_config::{CliArgs, Config, default_config_dir};
use tether_log::init_logging;
use tether_server::{SyncServer, outbound_channel};
use tether_world::NoopObjectModel;

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    let (outbound, outbox) = outbound_channel();
    let drain = std::thread::Builder::new()
        .name("outbound-drain".to_string())
        .spawn(move || {
            for (to, msg) in outbox {
                trace!("outbound {:?} to player {to}", msg.opcode());
            }
        });
    if let Err(err) = drain {
        error!("failed to start outbound drain thread: {err}");
        std::process::exit(1);
    }

    let server = SyncServer::new(&config, outbound, Box::new(NoopObjectModel));
    info!(
        "listening on {}:{} — {} Hz, up to {} players",
        config.server.bind_address,
        config.server.port,
        config.server.tick_rate,
        config.server.max_players
    );

    let tick_duration = Duration::from_secs(1) / config.server.tick_rate.max(1);
    loop {
        server.advance_tick();
        std::thread::sleep(tick_duration);
    }
}
