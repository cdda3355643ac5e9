// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use actix_web::{App, HttpServer, middleware, web};
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Serve the REST API until the process is stopped.
pub async fn run(cfg: ServerConfig, conn: Connection) -> Result<()> {
    let state = web::Data::new(AppState::new(conn));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind((cfg.host.as_str(), cfg.port))
    .with_context(|| format!("Bind {}:{}", cfg.host, cfg.port))?;

    info!(host = %cfg.host, port = cfg.port, "server listening");
    server.run().await.context("HTTP server failed")?;
    Ok(())
}
