// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use leningen::config::ServerConfig;
use leningen::{cli, commands, db, server};

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {}", e);
    }
}

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let serving = matches!(matches.subcommand(), Some(("serve", _)));
    init_tracing(if serving { "info" } else { "warn" });

    let db_override = matches.get_one::<PathBuf>("db").cloned();
    let (conn, path) = db::open_or_init(db_override.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("loan", sub)) => commands::loans::handle(&conn, sub)?,
        Some(("payment", sub)) => commands::payments::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("serve", sub)) => {
            let cfg = ServerConfig::from_env()?.with_overrides(
                sub.get_one::<String>("host").map(String::as_str),
                sub.get_one::<u16>("port").copied(),
            );
            if cfg.host != "127.0.0.1" && cfg.host != "localhost" {
                warn!(host = %cfg.host, "API has no authentication; exposing it beyond localhost");
            }
            actix_web::rt::System::new().block_on(server::run(cfg, conn))?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
