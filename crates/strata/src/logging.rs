use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `STRATA_LOG=strata_core=debug`.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Installs the global subscriber, writing to stderr so stdout stays clean
/// for command output.
///
/// `STRATA_LOG` wins when set; otherwise the level is `warn`, or `debug`
/// with `verbose`.
pub fn init_tracing(verbose: bool, json: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
