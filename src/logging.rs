//! Logging initialization

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber: console output (pretty or json) plus an optional
/// daily rolling file. Keep the returned guard alive so buffered lines get flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "camtrack_server={level},camtrack_import={level},tower_http=info,sqlx=warn",
            level = config.level
        ))
    });

    let json = config.format.eq_ignore_ascii_case("json");
    let json_layer = json.then(|| fmt::layer().json().with_current_span(true).with_target(true));
    let pretty_layer = (!json).then(|| fmt::layer().with_target(true));

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "camtrack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .init();

    guard
}
