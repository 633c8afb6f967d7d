// src/main.rs
use std::os::fd::AsRawFd;

use anyhow::Result;
use tracing::info;

use endpoint_listener::create_listener_file;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("endpoint_listener=debug".parse()?),
        )
        .init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tcp://127.0.0.1:8080".to_string());

    info!("Creating listener for: {}", endpoint);
    let (listener, file) = create_listener_file(&endpoint)?;

    info!(
        addr = %listener.local_addr_string()?,
        fd = file.as_raw_fd(),
        "listener bound, descriptor ready for hand-off"
    );

    Ok(())
}
