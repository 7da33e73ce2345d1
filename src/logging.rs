use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a global tracing subscriber writing to stdout
///
/// Log levels are read from the `RUST_LOG` environment variable. Calling this
/// more than once has no effect, and neither does calling it if another global
/// subscriber is already installed.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .with(EnvFilter::from_default_env())
            .try_init()
            .unwrap_or(());
    });
}
