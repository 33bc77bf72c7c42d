//! process-exporter - Prometheus exporter for host and process resource usage.
//!
//! Samples `/proc` on every scrape and serves the result in the Prometheus
//! text exposition format.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use clap::Parser;
use prometheus::Registry;
use tower_http::compression::CompressionLayer;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use process_exporter_core::collector::{Exporter, RealFs};
use process_exporter_core::{ExporterConfig, ExporterError, metrics};

// ============================================================
// CLI
// ============================================================

/// Prometheus exporter for host and process resource usage.
#[derive(Parser, Debug)]
#[command(name = "process-exporter", version = process_exporter_core::VERSION)]
struct Args {
    /// Address to listen on for web interface and telemetry (":port" for all interfaces).
    #[arg(long, default_value = ":18000", env = "PROCESS_EXPORTER_ADDRESS")]
    address: String,

    /// Path under which to expose metrics.
    #[arg(long, default_value = "/metrics", env = "PROCESS_EXPORTER_ENDPOINT")]
    endpoint: String,

    /// URI of server status page we're going to scrape.
    #[arg(long, default_value = "", env = "PROCESS_EXPORTER_URI")]
    uri: String,

    /// Namespace prepended to every metric name.
    #[arg(long, default_value = "process_exporter", env = "PROCESS_EXPORTER_PREFIX")]
    prefix: String,

    /// PID of the process we're going to scrape.
    #[arg(long, default_value_t = 0, env = "PROCESS_EXPORTER_PID")]
    pid: u32,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn to_config(&self) -> Result<ExporterConfig, ExporterError> {
        Ok(ExporterConfig::default()
            .with_listen_address(&self.address)?
            .with_metrics_path(&self.endpoint)?
            .with_uri(self.uri.as_str())
            .with_namespace(self.prefix.as_str())
            .with_pid(self.pid)
            .with_proc_path(self.proc_path.as_str())
            .with_verbose(self.verbose > 0))
    }
}

// ============================================================
// Main
// ============================================================

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{:#}", e), "exiting");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["process_exporter", "process_exporter_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.to_config().context("invalid configuration")?;

    info!(
        version = process_exporter_core::VERSION,
        address = %config.listen_address,
        endpoint = %config.metrics_path,
        pid = config.pid,
        namespace = %config.namespace,
        "starting process exporter"
    );
    if !config.uri.is_empty() {
        info!(uri = %config.uri, "target status page");
    }
    if config.pid == 0 {
        warn!("no --pid given, process metrics will be reported as zero");
    }

    let exporter =
        Arc::new(Exporter::new(RealFs::new(), &config).context("failed to build exporter")?);
    let registry = Registry::new();
    metrics::register(&registry, exporter).context("failed to register exporter")?;

    let app = router(Arc::new(registry), &config.metrics_path);

    let listener = tokio::net::TcpListener::bind(config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    info!(addr = %config.listen_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

// ============================================================
// HTTP
// ============================================================

fn router(registry: Arc<Registry>, metrics_path: &str) -> Router {
    let mut app = Router::new().route(metrics_path, get(handle_metrics));

    if metrics_path != "/health" {
        app = app.route("/health", get(handle_health));
    }
    if metrics_path != "/" {
        let page = landing_page(metrics_path);
        app = app.route(
            "/",
            get(move || {
                let page = page.clone();
                async move { Html(page) }
            }),
        );
    }

    app.with_state(registry).layer(CompressionLayer::new())
}

/// Gathers on the blocking pool: a pass sleeps between `/proc/stat` reads
/// and may wait for the sampler lock.
async fn handle_metrics(State(registry): State<Arc<Registry>>) -> Response {
    match tokio::task::spawn_blocking(move || metrics::encode(&registry)).await {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
        Err(e) => {
            error!(error = %e, "metrics task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to collect metrics").into_response()
        }
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Process Exporter</title></head>\n\
         <body>\n\
         <h1>Process Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        metrics_path
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
