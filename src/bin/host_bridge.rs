//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! This binary reads `CommandEnvelope` messages as newline-delimited JSON
//! from stdin, dispatches them to the EchoMind controllers, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages to stdout.
//!
//! All tracing/diagnostic output goes to stderr (and optionally a daily log
//! file) so that stdout remains a clean JSON protocol channel.

use echomind::config::{ClientConfig, LoggingConfig};
use echomind::host::stdio::run_stdio_bridge;
use echomind::theme::Theme;
use echomind::{App, app_dirs};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = if logging.file {
        let appender = tracing_appender::rolling::daily(app_dirs::logs_dir(), "echomind-host.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = ClientConfig::default_config_path();
    let config = ClientConfig::load_or_default(&config_path)?;

    let _log_guard = init_tracing(&config.logging);
    tracing::info!(config = %config_path.display(), api = %config.api.base_url, "echomind-host starting");

    let app = Arc::new(App::from_config(&config)?);
    app.start().await;
    let theme_poller = config
        .ui
        .system_theme_poll()
        .map(|every| app.poll_system_theme(every, Theme::system));

    let result = run_stdio_bridge(app).await;
    if let Some(poller) = theme_poller {
        poller.abort();
    }
    result.map_err(|e| {
        tracing::error!(error = %e, "echomind-host exited with error");
        anyhow::anyhow!("echomind-host failed: {e}")
    })?;

    tracing::info!("echomind-host shut down cleanly");
    Ok(())
}
