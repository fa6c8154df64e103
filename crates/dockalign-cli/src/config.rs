//! Configuration Vault – reads/writes `~/.dockalign/config.toml`.

use dockalign_perception::turning::DEFAULT_EPSILON;
use dockalign_perception::{SceneConfig, SensorMount, TurningSolver};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Solver knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Minimum horizontal length of the POI offset and the surface normal.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Maximum allowed disagreement between the two POI derivations
    /// (metres).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Report turns wrapped into (-180, 180] instead of the raw angles.
    #[serde(default)]
    pub wrap_turns: bool,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}
fn default_tolerance() -> f64 {
    1e-6
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            tolerance: default_tolerance(),
            wrap_turns: false,
        }
    }
}

impl SolverConfig {
    pub fn solver(&self) -> TurningSolver {
        TurningSolver::new(self.epsilon)
    }

    /// Reject values that would silently disable a check.
    pub fn validate(&self) -> Result<(), String> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(format!(
                "solver.tolerance must be a finite non-negative number, got {}",
                self.tolerance
            ));
        }
        if self.epsilon.is_nan() {
            return Err("solver.epsilon must be a number, got NaN".to_string());
        }
        Ok(())
    }
}

/// Persisted user configuration stored in `~/.dockalign/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solver: SolverConfig,

    /// Demo scene layout used by `dockalign scene`.
    #[serde(default)]
    pub scene: SceneConfig,

    /// Sensor mount geometry on the wheelchair.
    #[serde(default)]
    pub mount: SensorMount,
}

/// Return the path to `~/.dockalign/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".dockalign").join("config.toml")
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Load `path` (or the default location), fall back to defaults when the
/// file is missing, then apply environment overrides.
pub fn resolve(path: Option<&Path>) -> Result<Config, String> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let mut cfg = match load_from(&path)? {
        Some(cfg) => {
            tracing::debug!(path = %path.display(), "config loaded");
            cfg
        }
        None => {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut cfg);
    cfg.solver.validate()?;
    Ok(cfg)
}

/// Apply `DOCKALIGN_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `DOCKALIGN_POI_OFFSET` | `scene.poi_offset` |
/// | `DOCKALIGN_EPSILON` | `solver.epsilon` |
/// | `DOCKALIGN_TOLERANCE` | `solver.tolerance` |
/// | `DOCKALIGN_WRAP_TURNS` | `solver.wrap_turns` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_with(cfg, |key| std::env::var(key).ok());
}

/// Apply overrides read through `lookup` instead of the process
/// environment.
pub(crate) fn apply_overrides_with(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DOCKALIGN_POI_OFFSET")
        && let Ok(offset) = v.parse::<f64>() {
            cfg.scene.poi_offset = offset;
        }
    if let Some(v) = lookup("DOCKALIGN_EPSILON")
        && let Ok(eps) = v.parse::<f64>() {
            cfg.solver.epsilon = eps;
        }
    if let Some(v) = lookup("DOCKALIGN_TOLERANCE")
        && let Ok(tol) = v.parse::<f64>() {
            cfg.solver.tolerance = tol;
        }
    if let Some(v) = lookup("DOCKALIGN_WRAP_TURNS")
        && let Ok(wrap) = v.parse::<bool>() {
            cfg.solver.wrap_turns = wrap;
        }
}

/// Save the config to a specific path, creating the parent directory if
/// necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
