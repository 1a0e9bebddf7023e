mod config;
mod migrate;
mod transport;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::AppConfig;
use scrapcore_core::ClientTokenSigner;
use scrapcore_core::ClientTokenSignerConfig;
use scrapcore_dispatcher::{Dispatcher, DispatcherConfig};
use scrapcore_http::config::HttpConfig;
use scrapcore_router::{Router, RouterConfig};
use scrapcore_store::Store;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use worker::{NoopExecutor, Worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "scrapcore-harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: AppConfig,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending Task Store migrations and exit.
    Migrate,
    /// Run the Dispatcher + Router pipeline (no embedded HTTP Surface).
    Dispatcher,
    /// Run one Worker process for a single account.
    Worker {
        #[arg(long, env = "WORKER_ACCOUNT_ID")]
        account_id: String,
    },
    /// Run the HTTP Surface only.
    Http,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn build_signer(cfg: &AppConfig) -> anyhow::Result<ClientTokenSigner> {
    Ok(ClientTokenSigner::from_config(ClientTokenSignerConfig {
        issuer: cfg.jwt_issuer.clone(),
        audience: cfg.jwt_audience.clone(),
        current_kid: cfg.jwt_kid.clone(),
        current_secret: cfg.jwt_secret_key.clone(),
        next_kid: cfg.jwt_next_kid.clone(),
        next_secret: cfg.jwt_next_secret_key.clone(),
        ttl: Duration::from_secs(cfg.jwt_ttl_s),
    })?)
}

fn build_http_config(cfg: &AppConfig) -> anyhow::Result<HttpConfig> {
    let api_clients = match &cfg.api_clients_json {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Default::default(),
    };
    let http_cfg = HttpConfig {
        api_shared_secret: cfg.api_shared_secret.clone(),
        api_clients,
        require_https: cfg.resolved_require_https(),
        require_account_in_config: cfg.resolved_require_account_in_config(),
        configured_accounts: cfg.accounts_usernames.clone(),
        production: cfg.is_production(),
        redis_url: cfg.redis_url.clone(),
        cors_origins: cfg.cors_origins.clone(),
        ..Default::default()
    };
    Ok(http_cfg)
}

fn router_config(cfg: &AppConfig) -> RouterConfig {
    RouterConfig {
        max_inflight_per_account: cfg.worker_max_inflight_per_account,
        tokens_capacity: cfg.worker_tokens_capacity,
        tokens_refill_per_sec: cfg.worker_tokens_refill_per_sec,
        base_backoff_s: cfg.worker_base_backoff_s,
        max_backoff_s: cfg.worker_max_backoff_s,
        jitter_s: cfg.worker_jitter_s,
        aging_step: cfg.worker_aging_step,
        aging_cap: cfg.worker_aging_cap,
        load_balance_weight: cfg.worker_load_balance_weight,
        token_availability_weight: cfg.worker_token_availability_weight,
        urgency_weight: cfg.worker_urgency_weight,
        default_batch_size: cfg.worker_default_batch_size,
        max_attempts: cfg.worker_max_attempts,
        ..Default::default()
    }
}

fn dispatcher_config(cfg: &AppConfig) -> DispatcherConfig {
    DispatcherConfig {
        scan_interval_s: cfg.scan_interval_s,
        lease_cleanup_interval_s: cfg.lease_cleanup_interval,
        cleanup_interval_s: cfg.cleanup_interval,
        lease_reclaim_batch: cfg.lease_reclaim_batch,
        cleanup_older_than_days: cfg.cleanup_stale_days.max(cfg.cleanup_finished_days),
        cleanup_batch: cfg.cleanup_batch,
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => {
            migrate::run(&cli.config.database_url).await?;
        }
        Command::Dispatcher => {
            if cli.config.accounts_usernames.is_empty() {
                tracing::error!("no worker accounts configured");
                std::process::exit(1);
            }
            let store = Store::connect(&cli.config.database_url, cli.config.db_max_connections).await?;
            let transports = transport::build(&cli.config).await?;
            let router = Router::new(router_config(&cli.config), store.clone(), transports.tasks.clone());
            let mut dispatcher = Dispatcher::new(
                store,
                router,
                transports.results,
                cli.config.accounts_usernames.clone(),
                dispatcher_config(&cli.config),
            )?;

            let (stop_tx, stop_rx) = watch::channel(false);
            install_shutdown_handler(stop_tx);
            dispatcher.run(stop_rx).await?;
        }
        Command::Worker { account_id } => {
            let store = Store::connect(&cli.config.database_url, cli.config.db_max_connections).await?;
            let transports = transport::build(&cli.config).await?;
            let worker = Worker::new(
                WorkerConfig {
                    account_id: account_id.clone(),
                    worker_name: format!("worker-{account_id}"),
                    poll_interval: Duration::from_millis(cli.config.worker_poll_interval_ms),
                    heartbeat_interval: Duration::from_secs(cli.config.worker_heartbeat_s),
                },
                store,
                transports.tasks,
                transports.results,
                Arc::new(NoopExecutor),
            );
            let (stop_tx, stop_rx) = watch::channel(false);
            install_shutdown_handler(stop_tx);
            worker.run(stop_rx).await;
        }
        Command::Http => {
            let store = Store::connect(&cli.config.database_url, cli.config.db_max_connections).await?;
            let signer = build_signer(&cli.config)?;
            let http_cfg = build_http_config(&cli.config)?;
            let state = scrapcore_http::build_state(store, signer, http_cfg).await;
            let app = scrapcore_http::router(state);
            let listener = tokio::net::TcpListener::bind(&cli.config.http_bind_addr).await?;
            tracing::info!(addr = %cli.config.http_bind_addr, "http surface listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn install_shutdown_handler(stop_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler");
        #[cfg(unix)]
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }
        let _ = stop_tx.send(true);
    });
}
