//! tourney-watch - alerting and health monitoring service

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tourney_watch::monitoring::health::ProcessSampler;
use tourney_watch::monitoring::wait_for_os_signal;
use tourney_watch::utils::logging::{LogFormat, init_logging};
use tourney_watch::{AlertSystem, AlertSystemConfig, DatabaseHandle, HttpServer, Shutdown};
use tracing::{error, info, warn};

/// Alerting and health monitoring for the tournament platform
#[derive(Debug, Parser)]
#[command(name = "tourney-watch", version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "TOURNEY_WATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_logging(LogFormat::from_env(), "info");

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = AlertSystemConfig::load(args.config.as_deref())
        .await
        .context("loading configuration")?;

    let db: Option<Arc<dyn DatabaseHandle>> = match &config.database_url {
        Some(url) => match sea_orm::Database::connect(url.as_str()).await {
            Ok(conn) => {
                info!("Connected to database");
                Some(Arc::new(conn))
            }
            Err(e) => {
                warn!("Database connection failed, probing without a handle: {}", e);
                None
            }
        },
        None => None,
    };

    let system = Arc::new(
        AlertSystem::with_registry(
            config.clone(),
            db,
            prometheus::Registry::new(),
            Arc::new(ProcessSampler::new()),
        )
        .context("building alert system")?,
    );
    system.initialize().await.context("initializing alert system")?;

    let shutdown = Shutdown::new();
    system.start(shutdown.signal()).await.context("starting alert system")?;

    let server = HttpServer::new(config.server.clone(), system.clone());
    let mut serving = tokio::spawn(server.start(shutdown.signal()));

    let finished = tokio::select! {
        _ = wait_for_os_signal() => {
            info!("Shutdown requested");
            None
        }
        result = &mut serving => Some(result),
    };
    shutdown.trigger();

    let served = match finished {
        Some(result) => result,
        None => serving.await,
    };
    system.stop().await?;

    match served {
        Ok(result) => result.context("serving the management API")?,
        Err(e) => warn!("HTTP server task failed: {}", e),
    }

    info!("tourney-watch stopped");
    Ok(())
}
