use tracing_subscriber::EnvFilter;

/// Console logging to stderr so stdout stays clean for command output.
/// `RUST_LOG` overrides the default directives.
pub fn init_logging(verbose: bool) {
    // Matches every salescope_* crate by target prefix.
    let default = if verbose { "warn,salescope=debug" } else { "warn,salescope=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
