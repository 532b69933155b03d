use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging to stderr so stdout stays clean for merged output.
/// `RUST_LOG` takes precedence over the `verbose` default.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
