use tracing_subscriber::EnvFilter;

/// Console logging for CLI runs. `RUST_LOG` overrides the default level.
pub fn init() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| err.to_string())
}
