use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::{console_filter, init_basic_console_logging};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the global subscriber: compact console output on stderr, a daily
/// error log and a daily JSON log under `log_dir`.
///
/// Falls back to console-only logging when observability is disabled or the
/// log directory cannot be created.
pub fn init_tracing(log_dir: &Path) {
    if !is_observability_enabled() {
        init_basic_console_logging();
        return;
    }

    if let Err(e) = fs::create_dir_all(log_dir) {
        init_basic_console_logging();
        warn!(
            log_dir = %log_dir.display(),
            error = %e,
            "Failed to create log directory, file logging disabled"
        );
        return;
    }

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(console_filter());

    let error_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "facilitydesk.log");
    let error_layer = fmt::layer()
        .with_writer(error_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "facilitydesk.json");
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(error_layer)
        .with(json_layer)
        .init();
}
