use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info` with debug output
/// for the calling crate.
pub fn init(crate_name: &str) -> Result<()> {
    let default_directives = format!("info,{}=debug", crate_name.replace('-', "_"));
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!(e))
}

#[macro_export]
macro_rules! init_tracing {
    () => {
        $crate::logging::init(env!("CARGO_PKG_NAME"))
    };
}
