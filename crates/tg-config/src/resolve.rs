//! Model file resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → system
//! paths. When no file is found the caller falls back to a preset.

use std::path::{Path, PathBuf};

/// Where the model configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via `--model`.
    CliArgument,

    /// Set via TRENDGUARD_MODEL.
    Environment,

    /// Found in the `--config-dir` / TRENDGUARD_CONFIG_DIR directory.
    ConfigDir,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/trendguard/.
    SystemConfig,

    /// Named built-in preset selected with `--preset`.
    Preset,

    /// Using the built-in default preset.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigDir => write!(f, "config directory"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::Preset => write!(f, "preset"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved model file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_MODEL_PATH: &str = "TRENDGUARD_MODEL";
pub const ENV_CONFIG_DIR: &str = "TRENDGUARD_CONFIG_DIR";

/// Standard model file name.
pub const MODEL_FILENAME: &str = "model.json";

/// Application name for XDG directories.
const APP_NAME: &str = "trendguard";

/// Resolve the model file path using the standard resolution order.
///
/// 1. Explicit CLI path (returned even if missing so loading reports it)
/// 2. TRENDGUARD_MODEL environment variable
/// 3. `config_dir` (or TRENDGUARD_CONFIG_DIR) + model.json
/// 4. XDG config directory (~/.config/trendguard/)
/// 5. System config (/etc/trendguard/)
///
/// Returns `None` when no file applies; callers then use a preset.
pub fn resolve_model_path(cli_path: Option<&Path>, config_dir: Option<&Path>) -> Option<ModelPath> {
    resolve_with_env(cli_path, config_dir, |key| std::env::var(key).ok())
}

/// Same as [`resolve_model_path`] with an injectable environment lookup.
pub fn resolve_with_env<F>(
    cli_path: Option<&Path>,
    config_dir: Option<&Path>,
    env: F,
) -> Option<ModelPath>
where
    F: Fn(&str) -> Option<String>,
{
    let found = |path: PathBuf, source: ConfigSource| {
        if path.is_file() {
            Some(ModelPath { path, source })
        } else {
            None
        }
    };

    // 1. CLI argument
    if let Some(path) = cli_path {
        return Some(ModelPath {
            path: path.to_path_buf(),
            source: ConfigSource::CliArgument,
        });
    }

    // 2. Environment variable (direct path)
    if let Some(hit) = env(ENV_MODEL_PATH)
        .filter(|p| !p.is_empty())
        .and_then(|p| found(PathBuf::from(p), ConfigSource::Environment))
    {
        return Some(hit);
    }

    // 3. Config dir (CLI flag, then environment)
    let dir = config_dir
        .map(Path::to_path_buf)
        .or_else(|| env(ENV_CONFIG_DIR).filter(|d| !d.is_empty()).map(PathBuf::from));
    if let Some(hit) = dir.and_then(|d| found(d.join(MODEL_FILENAME), ConfigSource::ConfigDir)) {
        return Some(hit);
    }

    // 4. XDG config directory
    if let Some(hit) =
        xdg_config_dir().and_then(|d| found(d.join(MODEL_FILENAME), ConfigSource::XdgConfig))
    {
        return Some(hit);
    }

    // 5. System config
    found(
        system_config_dir().join(MODEL_FILENAME),
        ConfigSource::SystemConfig,
    )
}

/// Get the XDG config directory for trendguard.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
