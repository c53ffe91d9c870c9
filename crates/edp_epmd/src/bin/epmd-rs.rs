// Copyright (C) 2025-2026 Michael S. Klishin and Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A standalone port-mapper daemon, a drop-in for the system's `epmd`
//! binary for testing and for environments where running the real one
//! isn't an option.

use clap::Parser;
use edp_epmd::{EPMD_PORT, Registry, Result, serve};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "epmd-rs", about = "Erlang Port Mapper Daemon, in Rust")]
struct Args {
    /// Port to listen on. Defaults to `ERL_EPMD_PORT`, or 4369.
    #[arg(short, long)]
    port: Option<u16>,
}

fn default_port() -> u16 {
    std::env::var("ERL_EPMD_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(EPMD_PORT)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let port = args.port.unwrap_or_else(default_port);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("epmd-rs listening on port {port}");

    let registry = Arc::new(Registry::new());
    serve(listener, registry, port).await?;

    Ok(())
}
