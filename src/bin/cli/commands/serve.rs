use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use fiszki_lib::server::start_server;

use crate::app::App;

pub fn run(
    app: &App,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = app.config.server.clone();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if static_dir.is_some() {
        config.static_dir = static_dir;
    }

    let storage = Arc::clone(&app.storage);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let server = start_server(storage, &config)
            .await
            .map_err(|e| anyhow!("Failed to start server: {}", e))?;
        println!("Server running at {}", server.base_url());

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        server.shutdown().await;
        Ok::<(), anyhow::Error>(())
    })
}
