use tracing_subscriber::EnvFilter;

/// Diagnostic logs go to stderr so they never mix with progress lines on stdout.
/// `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "tubefetch=debug" } else { "tubefetch=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
