use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "BUILDTASKS_LOG";

static INIT: Once = Once::new();

/// Installs the stderr subscriber. `BUILDTASKS_LOG` overrides the default
/// filter, e.g. `BUILDTASKS_LOG=buildtasks::grep=debug`.
///
/// Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose),
            )
            .with(filter)
            .init();
    });
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "buildtasks=debug"
    } else {
        "buildtasks=info"
    }
}
