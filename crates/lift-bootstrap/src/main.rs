//! bootstrap — the Lift custom runtime executable.
//!
//! Started by the platform in the execution environment. Reads its
//! configuration from the environment, assembles the hosted application,
//! and runs the invocation loop until SIGTERM or Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! AWS_LAMBDA_RUNTIME_API=127.0.0.1:9001 _HANDLER=public/index.html bootstrap
//! bootstrap --runtime-api 127.0.0.1:9001 --handler public --upstream 127.0.0.1:8080
//! ```

mod assemble;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lift_app::DEFAULT_INDEX;
use lift_runtime::config::DEFAULT_TASK_ROOT;
use lift_runtime::{HttpRuntimeApi, InvocationLoop, RuntimeConfig, report_init_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "bootstrap", about = "Lift custom runtime", version)]
struct Cli {
    /// host:port of the Runtime API.
    #[arg(long, env = "AWS_LAMBDA_RUNTIME_API")]
    runtime_api: String,

    /// Directory holding the deployed code.
    #[arg(long, env = "LAMBDA_TASK_ROOT", default_value = DEFAULT_TASK_ROOT)]
    task_root: PathBuf,

    /// Entry point, relative to the task root.
    #[arg(long, env = "_HANDLER")]
    handler: String,

    /// Per-invocation execution budget in seconds.
    #[arg(long, env = "MAX_EXECUTION_TIME", default_value_t = 30)]
    max_execution_time: u64,

    /// host:port of a local web application to forward unmatched requests to.
    #[arg(long, env = "LIFT_UPSTREAM")]
    upstream: Option<String>,

    /// Directory index file names, tried in order.
    #[arg(long, env = "LIFT_INDEX", value_delimiter = ',', default_value = DEFAULT_INDEX)]
    index: Vec<String>,

    #[arg(long, env = "LIFT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::new(&self.runtime_api, &self.task_root, &self.handler)
            .with_max_execution_time(Duration::from_secs(self.max_execution_time))
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lift=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = cli.runtime_config();
    let client = HttpRuntimeApi::new(&config.runtime_api);
    info!(
        runtime_api = %config.runtime_api,
        task_root = %config.task_root.display(),
        handler = %config.handler,
        max_execution_time_s = config.max_execution_time.as_secs(),
        "bootstrap starting"
    );

    let app = match config
        .validate()
        .map_err(anyhow::Error::from)
        .and_then(|()| assemble::build_application(&config, cli.upstream.as_deref(), &cli.index))
    {
        Ok(app) => app,
        Err(e) => {
            if let Err(post) = report_init_error(&client, "Runtime.InitError", format!("{e:#}")).await
            {
                error!(error = %post, "failed to report init error");
            }
            return Err(e.context("runtime initialization failed"));
        }
    };

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    InvocationLoop::new(client, app, &config)
        .run(shutdown_rx)
        .await;

    info!("bootstrap stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = term.recv() => {}
                    _ = ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
