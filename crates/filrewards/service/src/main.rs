use clap::{Parser, ValueEnum};
use filrewards_core::{RewardsConfig, StorageConfig, DEFAULT_BASE_AMOUNT};
use filrewards_service::{build_router, grpc::serve_grpc, ServiceConfig, ServiceState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StorageMode {
    Auto,
    Memory,
    Postgres,
}

#[derive(Debug, Parser)]
#[command(name = "filrewardsd", version, about = "Filecoin rewards daemon")]
struct Cli {
    /// REST socket address to bind, e.g. 127.0.0.1:8092
    #[arg(long, default_value = "127.0.0.1:8092", env = "FILREWARDS_LISTEN")]
    listen: SocketAddr,
    /// gRPC socket address to bind, e.g. 127.0.0.1:5006
    #[arg(long, default_value = "127.0.0.1:5006", env = "FILREWARDS_GRPC_LISTEN")]
    grpc_listen: SocketAddr,
    /// Disable gRPC server and run REST only.
    #[arg(long, default_value_t = false)]
    no_grpc: bool,
    /// Ledger persistence backend. `auto` picks postgres when a database url is configured.
    #[arg(long, value_enum, default_value_t = StorageMode::Auto, env = "FILREWARDS_STORAGE")]
    storage: StorageMode,
    /// PostgreSQL url for the reward and claim ledgers.
    #[arg(long, env = "FILREWARDS_DATABASE_URL")]
    database_url: Option<String>,
    /// Max PostgreSQL pool connections.
    #[arg(long, default_value_t = 5, env = "FILREWARDS_PG_MAX_CONNECTIONS")]
    pg_max_connections: u32,
    /// Base reward amount in attoFIL, multiplied by each reward type's factor.
    #[arg(long, default_value_t = DEFAULT_BASE_AMOUNT, env = "FILREWARDS_BASE_ATTO_FIL_REWARD")]
    base_atto_fil_reward: i64,
    /// Usage-tracking endpoint. Events are dropped when unset.
    #[arg(long, env = "FILREWARDS_ANALYTICS_ADDR")]
    analytics_addr: Option<String>,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[arg(long, default_value_t = 10, env = "FILREWARDS_SHUTDOWN_GRACE_SECS")]
    shutdown_grace_secs: u64,
    /// Log filrewards crates at debug level. `RUST_LOG` still takes precedence.
    #[arg(long, default_value_t = false, env = "FILREWARDS_DEBUG")]
    debug: bool,
    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn resolve_storage(cli: &Cli) -> anyhow::Result<StorageConfig> {
    let resolved_url = cli
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok());

    let storage = match cli.storage {
        StorageMode::Memory => StorageConfig::Memory,
        StorageMode::Postgres => {
            let database_url = resolved_url.ok_or_else(|| {
                anyhow::anyhow!("storage=postgres requires --database-url or DATABASE_URL")
            })?;
            StorageConfig::postgres(database_url, cli.pg_max_connections)
        }
        StorageMode::Auto => match resolved_url {
            Some(database_url) => StorageConfig::postgres(database_url, cli.pg_max_connections),
            None => StorageConfig::Memory,
        },
    };

    Ok(storage)
}

fn init_tracing(cli: &Cli) {
    let default_directives = if cli.debug {
        "filrewards=debug,info"
    } else {
        "filrewards=info,info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("received terminate signal, initiating graceful shutdown"),
    }
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let storage = resolve_storage(&cli)?;
    info!(backend = storage.label(), "opening ledger store");
    let config = ServiceConfig {
        rewards: RewardsConfig::default().with_base_amount(cli.base_atto_fil_reward),
        storage,
        analytics_addr: cli.analytics_addr.clone(),
    };
    let state = ServiceState::bootstrap(config).await?;
    let app = build_router(state.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut servers = JoinSet::new();

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!("filrewards REST listening on {}", listener.local_addr()?);
    let rest_shutdown = stopped(shutdown_rx.clone());
    servers.spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(rest_shutdown)
            .await
            .map_err(anyhow::Error::from)
    });

    if !cli.no_grpc {
        let grpc_addr = cli.grpc_listen;
        let grpc_shutdown = stopped(shutdown_rx.clone());
        info!("filrewards gRPC listening on {}", grpc_addr);
        servers.spawn(async move { serve_grpc(state, grpc_addr, grpc_shutdown).await });
    }

    tokio::select! {
        _ = shutdown_signal() => {}
        Some(result) = servers.join_next() => {
            result??;
            warn!("server exited before shutdown was requested");
        }
    }

    let _ = shutdown_tx.send(true);
    let grace = Duration::from_secs(cli.shutdown_grace_secs);
    let drained = tokio::time::timeout(grace, async {
        while let Some(result) = servers.join_next().await {
            result??;
        }
        Ok::<_, anyhow::Error>(())
    })
    .await;

    match drained {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                grace_secs = cli.shutdown_grace_secs,
                "servers did not stop within the grace period; aborting"
            );
            servers.abort_all();
        }
    }

    info!("filrewardsd stopped");
    Ok(())
}
