use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const DEFAULT_DIRECTIVES: &str = "meshx_batch=info,meshx_merkle=info";

/// Install a stderr subscriber filtered by `RUST_LOG`.
///
/// Stdout is reserved for command output.
pub fn init_tracing() -> Result<()> {
    let filter_layer = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder().parse(DEFAULT_DIRECTIVES)?,
    };

    Registry::default()
        .with(filter_layer)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
