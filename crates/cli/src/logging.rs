//! `tracing` subscriber setup. Logs go to stderr so stdout stays clean for
//! command output.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, with the reelops crates at
/// `debug` when `verbose` is on.
pub(crate) fn init(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "info,reelops=debug,reelops_lifecycle=debug,reelops_storage=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Already installed is fine.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
