use anyhow::Result;
use clap::Parser;
use image_compressor::config::Config;
use image_compressor::image::ImageProcessor;
use image_compressor::server;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-compressor")]
#[command(about = "Serve the upload-image compression endpoint")]
struct CliArgs {
    /// Address to bind; overrides HOST.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind; overrides PORT.
    #[arg(long, short)]
    port: Option<u16>,
}

impl CliArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_compressor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting image-compressor v{}", env!("CARGO_PKG_VERSION"));

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => args.apply(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Body limit: {} bytes, binding {}",
        config.max_body_bytes,
        config.socket_addr()
    );

    if let Err(e) = server::run(config, Arc::new(ImageProcessor::new())).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = CliArgs::parse_from(["image-compressor", "--host", "127.0.0.1", "-p", "9001"]);
        let config = args.apply(Config::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9001");
    }

    #[test]
    fn test_cli_without_flags_keeps_config() {
        let args = CliArgs::parse_from(["image-compressor"]);
        let config = args.apply(Config::default());
        assert_eq!(config.port, image_compressor::config::DEFAULT_PORT);
    }

    #[test]
    fn test_cli_rejects_bad_host() {
        assert!(CliArgs::try_parse_from(["image-compressor", "--host", "nowhere"]).is_err());
    }
}
