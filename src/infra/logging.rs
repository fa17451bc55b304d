use tracing_subscriber::EnvFilter;

/// Installs a default subscriber for hosts that do not bring their own.
/// Base level comes from the caller, still overridable via RUST_LOG; noisy
/// dependencies are capped at warn. Safe to call more than once.
pub fn init_logging(level: &str) {
    let default = format!("{level},netbatch={level},sqlx=warn,reqwest=warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .try_init();
}
