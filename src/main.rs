use anyhow::Result;
use clap::Parser;
use statusd::{config::ServiceConfig, server, AppContext};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "statusd",
    about = "Dependency status page — probes PostgreSQL and external APIs",
    version
)]
struct Args {
    /// HTTP server port
    #[arg(long, env = "STATUSD_PORT")]
    port: Option<u16>,

    /// Bind address (default: 0.0.0.0)
    #[arg(long, env = "STATUSD_BIND")]
    bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STATUSD_LOG")]
    log: Option<String>,

    /// Path to the TOML config file (default: ./statusd.toml)
    #[arg(long, env = "STATUSD_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "STATUSD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::new(args.port, args.bind_address, args.log, args.config);

    // Keep the non-blocking writer guard alive for the process lifetime.
    let _log_guard = init_logging(&config.log, &config.log_format, args.log_file.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        db = %config.database.summary(),
        "statusd starting"
    );
    if config.egress.cloudflare_accept_invalid_certs {
        tracing::warn!("TLS certificate verification is DISABLED for the Cloudflare probe");
    }

    let ctx = Arc::new(AppContext::new(config));
    server::start_server(ctx).await
}

/// Initialize tracing: compact pretty output by default, JSON when configured,
/// optionally teeing into a daily-rotated log file.
fn init_logging(
    log_level: &str,
    log_format: &str,
    log_file: Option<&std::path::Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("statusd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
