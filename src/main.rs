//! lobbyd - Lobby IRC Daemon.

use lobbyd::Server;
use lobbyd::config::{Config, validate};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lobbyd.toml".to_string());

    // Config first: the default log level depends on it.
    let config = Config::load(&config_path);
    let default_level = match &config {
        Ok(config) if config.server.verbose => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .init();

    let config = config.map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        hostname = %config.server.hostname,
        address = %config.listen.address,
        tls = config.tls.is_some(),
        "Starting lobbyd"
    );

    let server = Server::build(&config).await?;
    info!(address = %server.local_addr()?, "Listening");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            Ok(())
        }
    }
}
