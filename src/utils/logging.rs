use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// RUST_LOG wins over the configured level; an unparsable level falls back to info
pub fn init_tracing(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(build_filter(log_level)?)
        .try_init()?;

    Ok(())
}

fn build_filter(log_level: &str) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let filter = EnvFilter::try_new(log_level).or_else(|_| EnvFilter::try_new("info"))?;
    Ok(filter)
}
