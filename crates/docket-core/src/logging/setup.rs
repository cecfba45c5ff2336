//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Default directive when `DOCKET_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "docket=info";

/// Initialize the docket tracing system.
///
/// Reads `DOCKET_LOG` for per-crate levels, e.g.
/// `DOCKET_LOG=docket_queue=debug,docket_store=info`.
///
/// Idempotent. Later calls are no-ops, including calls to
/// [`init_tracing_with_filter`].
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DOCKET_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Initialize tracing with an explicit filter string (tests, embedding hosts).
pub fn init_tracing_with_filter(directives: &str) {
    install(EnvFilter::new(directives));
}

fn install(filter: EnvFilter) {
    INIT.call_once(|| {
        // A host may already own the global subscriber; keep theirs.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
