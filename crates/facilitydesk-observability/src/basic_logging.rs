use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default level when neither `RUST_LOG` nor `LOG_LEVEL` is set. Kept quiet
/// because console output shares the terminal with command output.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const CRATE_TARGETS: [&str; 4] = [
    "facilitydesk",
    "facilitydesk_auth",
    "facilitydesk_store",
    "facilitydesk_core",
];

/// Builds the console filter: `RUST_LOG` wins, otherwise `LOG_LEVEL` is
/// applied to the facilitydesk crates and everything else stays at `warn`.
pub fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        EnvFilter::new(filter_directives(&level))
    })
}

pub(crate) fn filter_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in CRATE_TARGETS {
        directives.push_str(&format!(",{}={}", target, level));
    }
    directives
}

/// Initialize console logging only.
///
/// Output goes to stderr in compact form so it never mixes with what a
/// command prints on stdout.
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter());

    tracing_subscriber::registry().with(console_layer).init();
}
