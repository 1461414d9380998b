use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
///
/// `RUST_LOG` overrides the level chosen on the command line.
pub fn init_logging(log_level: Level) -> Result<()> {
    let level_str = log_level.as_str().to_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("atelier={level_str},atelier_client={level_str},atelier_core={level_str}").into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
