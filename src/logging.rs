//! Tracing subscriber setup for applications embedding the pipeline.
//!
//! The library itself only emits `tracing` events; call
//! [`init_tracing_subscriber`] once at startup to print them.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn is_development() -> bool {
    cfg!(debug_assertions)
}

fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        if is_dev { "info" } else { "warn" }.to_string(),
        if is_dev { "breed_lens=debug" } else { "breed_lens=info" }.to_string(),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
    ]
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// defaults above when it is unset or invalid.
///
/// Fails if a global subscriber is already registered.
pub fn init_tracing_subscriber() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(build_filter_directives(is_development()).join(",")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    Ok(())
}
