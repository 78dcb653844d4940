use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Custom error type for config loading.
#[atelier_derive::app_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", fmt_context(context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layered strategy:
/// 1. **Base file**: settings from a file (e.g., `server.toml`); defaults to `"server"`.
/// 2. **Environment overrides**: variables prefixed with `ATELIER__`, nested
///    keys separated by double underscores (e.g., `ATELIER__DATABASE__URL`
///    maps to `database.url`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing, an override is
/// malformed, or the merged settings do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use atelier_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix("ATELIER").separator("__").convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
