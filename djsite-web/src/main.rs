//! djsite-web - DJ set catalog service
//!
//! Serves the public set catalog and the admin page on one port.

use anyhow::Result;
use clap::Parser;
use djsite_common::config::{AccessPolicyKind, SettingsOverrides, SiteSettings, TomlConfig};
use djsite_web::{build_router, AppContext};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "djsite-web")]
#[command(about = "DJ set catalog website")]
#[command(version)]
struct Args {
    /// Root folder holding the database and blobs
    #[arg(long, env = "DJSITE_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "DJSITE_BIND")]
    bind: Option<String>,

    /// Config file (TOML)
    #[arg(long, env = "DJSITE_CONFIG")]
    config: Option<PathBuf>,

    /// Admin access policy: shared_secret or allow_list
    #[arg(long, value_parser = parse_policy)]
    access_policy: Option<AccessPolicyKind>,
}

fn parse_policy(raw: &str) -> std::result::Result<AccessPolicyKind, String> {
    raw.parse().map_err(|e: djsite_common::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load(args.config.as_deref());
    let config_loaded = toml_config.is_some();

    let overrides = SettingsOverrides {
        root_folder: args.root_folder,
        bind_address: args.bind,
        access_policy: args.access_policy,
    };
    let settings = SiteSettings::resolve(&overrides, toml_config)?;

    // `log_level` already folds in RUST_LOG and the config file's [logging] level
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&settings.log_level))
        .init();

    // Build identification first, before any I/O that could stall
    info!(
        "Starting djsite-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // The config file is read before logging exists, so repeat its failure here
    if let (Some(path), false) = (&args.config, config_loaded) {
        tracing::warn!("Config file {} could not be loaded; using environment and defaults", path.display());
    }

    info!("Root folder: {}", settings.root_folder.display());
    info!("Access policy: {}", settings.access_policy.as_str());

    let bind_address = settings.bind_address.clone();
    let ctx = match AppContext::init(settings).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("djsite-web listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
