//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging with a default filter of `info`; `verbose` raises it
/// to `debug`.
///
/// `RUST_LOG` still wins when set. Repeated calls are ignored.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}
