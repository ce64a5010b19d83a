use crate::{
    dispatcher::Dispatcher,
    echo::EchoController,
    middleware::{MetricsMiddleware, TracingMiddleware},
    registry::Registry,
    router::{CamelCaseNames, Router},
    runtime_config::RuntimeConfig,
    server::{AppService, HttpServer, ServerHandle},
};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Command-line interface for the jetrouter demo server
#[derive(Parser, Debug)]
#[command(name = "jetrouter")]
#[command(about = "Convention-based HTTP router", long_about = None, version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides JET_LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, pretty); overrides JET_LOG_FORMAT
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the demo echo controller
    Serve {
        /// Listen address, e.g. 127.0.0.1:8080
        #[arg(short, long, env = "JET_ADDR")]
        addr: Option<String>,

        /// Cooperative per-request deadline in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Print the route table of the demo controller
    Routes,
}

/// Build a router holding the demo controller's routes.
#[must_use]
pub fn build_router(config: &RuntimeConfig) -> Arc<Router> {
    let router = Arc::new(Router::new(&config.wildcard));
    let registry = Registry::new(Arc::clone(&router))
        .with_naming(CamelCaseNames::new(&config.name_marker, &config.wildcard));
    let report = registry.register(Arc::new(EchoController::new()));
    for (name, reason) in &report.skipped {
        info!(endpoint = %name, reason = %reason, "Endpoint not routed");
    }
    router
}

/// Build the service stack: dispatcher, then tracing and metrics middleware.
#[must_use]
pub fn build_service(router: Arc<Router>, timeout: Option<Duration>) -> AppService {
    let mut dispatcher = Dispatcher::new(router);
    if let Some(timeout) = timeout {
        dispatcher = dispatcher.with_request_timeout(timeout);
    }
    AppService::new(Arc::new(dispatcher))
        .with_middleware(Arc::new(TracingMiddleware::default()))
        .with_middleware(Arc::new(MetricsMiddleware::new()))
}

/// Execute the parsed command.
///
/// # Errors
///
/// Returns an error if the server cannot bind its address or the signal
/// handlers cannot be installed.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let config = RuntimeConfig::from_env();
    match cli.command {
        Commands::Serve { addr, timeout_ms } => {
            may::config().set_stack_size(config.stack_size);
            let router = build_router(&config);
            let service = build_service(router, timeout_ms.map(Duration::from_millis));
            let addr = addr.unwrap_or_else(|| config.addr.clone());
            let handle = HttpServer(service)
                .start(addr.as_str())
                .with_context(|| format!("failed to start server on {addr}"))?;
            wait_for_shutdown(handle)
        }
        Commands::Routes => {
            let router = build_router(&config);
            for (key, handler) in router.routes() {
                println!("{key:<32} {handler}");
            }
            Ok(())
        }
    }
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> anyhow::Result<()> {
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))
}
