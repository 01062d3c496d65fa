//! TOML Configuration File Support
//!
//! Loads Keepsake settings from `~/.config/keepsake/keepsake.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`KEEPSAKE_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [render]
//! export_width = 700
//! export_scale = 2.0
//! preview_width = 350
//! min_canvas = 64
//!
//! [choreography]
//! watchdog_grace_ms = 2000
//!
//! [decoration]
//! qr_chance = 0.35
//! sticker_chance = 0.5
//! max_stickers = 3
//! seal_rotation_max_deg = 18.0
//! background_chance = 0.25
//! seed = 42
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::choreography::DEFAULT_WATCHDOG_GRACE;
use crate::model::{DecorationOdds, DecorationRoller};
use crate::render::{MAX_PIXEL_DIMENSION, MIN_CANVAS};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Command-line argument
    Cli,
    /// Environment variable
    Env,
    /// TOML configuration file
    File,
    /// Built-in default
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[render]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderToml {
    /// Export width in logical points
    pub export_width: Option<u32>,
    /// Pixels per logical point for exports
    pub export_scale: Option<f32>,
    /// Width used for draft previews
    pub preview_width: Option<u32>,
    /// Fallback canvas for degenerate layouts, in pixels
    pub min_canvas: Option<u32>,
}

/// `[choreography]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyToml {
    /// Allowance past a ritual's last phase before it is force-completed
    pub watchdog_grace_ms: Option<u64>,
}

/// `[decoration]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationToml {
    /// Chance of a QR payload
    pub qr_chance: Option<f64>,
    /// Chance of a sticker set
    pub sticker_chance: Option<f64>,
    /// Maximum stickers in one set
    pub max_stickers: Option<usize>,
    /// Largest seal tilt in degrees
    pub seal_rotation_max_deg: Option<f32>,
    /// Chance of a background override
    pub background_chance: Option<f64>,
    /// Fixed RNG seed for reproducible mints
    pub seed: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepsakeToml {
    /// Render section
    pub render: RenderToml,
    /// Choreography section
    pub choreography: ChoreographyToml,
    /// Decoration section
    pub decoration: DecorationToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved render settings
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Export width in logical points
    pub export_width: u32,
    /// Pixels per logical point for exports
    pub export_scale: f32,
    /// Width used for draft previews
    pub preview_width: u32,
    /// Fallback canvas for degenerate layouts, in pixels
    pub min_canvas: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            export_width: 700,
            export_scale: 2.0,
            preview_width: 350,
            min_canvas: MIN_CANVAS,
        }
    }
}

/// Centralized configuration
///
/// Use [`load_config`] to load with priority handling, then
/// [`ConfigOverrides::apply`] for CLI flags.
#[derive(Clone, Debug)]
pub struct KeepsakeConfig {
    /// Render settings
    pub render: RenderSettings,

    /// Allowance past a ritual's last phase
    pub watchdog_grace: Duration,

    /// Decoration probability table
    pub decoration: DecorationOdds,

    /// Fixed decoration seed
    pub decoration_seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for KeepsakeConfig {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            watchdog_grace: DEFAULT_WATCHDOG_GRACE,
            decoration: DecorationOdds::default(),
            decoration_seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl KeepsakeConfig {
    /// Configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Decoration roller honoring the configured seed
    #[must_use]
    pub fn decoration_roller(&self) -> DecorationRoller {
        match self.decoration_seed {
            Some(seed) => DecorationRoller::seeded(self.decoration.clone(), seed),
            None => DecorationRoller::new(self.decoration.clone()),
        }
    }

    /// Reject values the pipeline cannot honor
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let render = &self.render;
        if render.export_width == 0 {
            return Err(invalid("render.export_width must be greater than 0"));
        }
        if render.preview_width == 0 {
            return Err(invalid("render.preview_width must be greater than 0"));
        }
        if !render.export_scale.is_finite() || render.export_scale < 1.0 {
            return Err(invalid(format!(
                "render.export_scale must be at least 1.0, got {}",
                render.export_scale
            )));
        }
        let export_px = f64::from(render.export_width) * f64::from(render.export_scale);
        if export_px > f64::from(MAX_PIXEL_DIMENSION) {
            return Err(invalid(format!(
                "render.export_width x render.export_scale must be at most {MAX_PIXEL_DIMENSION} pixels, got {export_px}"
            )));
        }
        if render.min_canvas == 0 || render.min_canvas > MAX_PIXEL_DIMENSION {
            return Err(invalid(format!(
                "render.min_canvas must be between 1 and {MAX_PIXEL_DIMENSION}"
            )));
        }

        let odds = &self.decoration;
        for (name, chance) in [
            ("qr_chance", odds.qr_chance),
            ("sticker_chance", odds.sticker_chance),
            ("background_chance", odds.background_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(invalid(format!(
                    "decoration.{name} must be between 0 and 1, got {chance}"
                )));
            }
        }
        if !odds.seal_rotation_max_deg.is_finite() {
            return Err(invalid("decoration.seal_rotation_max_deg must be finite"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Default configuration file path
///
/// `$XDG_CONFIG_HOME/keepsake/keepsake.toml`, typically
/// `~/.config/keepsake/keepsake.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("keepsake").join("keepsake.toml"))
}

/// Load configuration from the default path and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing file is not an error.
pub fn load_config() -> Result<KeepsakeConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the environment
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the merged
/// values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<KeepsakeConfig, ConfigError> {
    let mut config = KeepsakeConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: KeepsakeToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut KeepsakeConfig, toml: &KeepsakeToml) {
    if let Some(width) = toml.render.export_width {
        config.render.export_width = width;
    }
    if let Some(scale) = toml.render.export_scale {
        config.render.export_scale = scale;
    }
    if let Some(width) = toml.render.preview_width {
        config.render.preview_width = width;
    }
    if let Some(min) = toml.render.min_canvas {
        config.render.min_canvas = min;
    }

    if let Some(ms) = toml.choreography.watchdog_grace_ms {
        config.watchdog_grace = Duration::from_millis(ms);
    }

    let decoration = &toml.decoration;
    if let Some(chance) = decoration.qr_chance {
        config.decoration.qr_chance = chance;
    }
    if let Some(chance) = decoration.sticker_chance {
        config.decoration.sticker_chance = chance;
    }
    if let Some(max) = decoration.max_stickers {
        config.decoration.max_stickers = max;
    }
    if let Some(deg) = decoration.seal_rotation_max_deg {
        config.decoration.seal_rotation_max_deg = deg;
    }
    if let Some(chance) = decoration.background_chance {
        config.decoration.background_chance = chance;
    }
    if decoration.seed.is_some() {
        config.decoration_seed = decoration.seed;
    }
}

/// Apply `KEEPSAKE_*` overrides read through `lookup`
///
/// Unparseable values are ignored with a warning.
fn apply_env_config<F>(config: &mut KeepsakeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    fn parsed<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
        let raw = raw?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(var = key, value = %raw, "Ignoring unparseable environment override");
                None
            }
        }
    }

    let mut touched = false;
    let mut env = |key: &str| {
        let value = lookup(key);
        touched |= value.is_some();
        value
    };

    if let Some(width) = parsed("KEEPSAKE_EXPORT_WIDTH", env("KEEPSAKE_EXPORT_WIDTH")) {
        config.render.export_width = width;
    }
    if let Some(scale) = parsed("KEEPSAKE_EXPORT_SCALE", env("KEEPSAKE_EXPORT_SCALE")) {
        config.render.export_scale = scale;
    }
    if let Some(width) = parsed("KEEPSAKE_PREVIEW_WIDTH", env("KEEPSAKE_PREVIEW_WIDTH")) {
        config.render.preview_width = width;
    }
    if let Some(min) = parsed("KEEPSAKE_MIN_CANVAS", env("KEEPSAKE_MIN_CANVAS")) {
        config.render.min_canvas = min;
    }
    if let Some(ms) = parsed::<u64>("KEEPSAKE_WATCHDOG_GRACE_MS", env("KEEPSAKE_WATCHDOG_GRACE_MS")) {
        config.watchdog_grace = Duration::from_millis(ms);
    }
    if let Some(seed) = parsed("KEEPSAKE_DECORATION_SEED", env("KEEPSAKE_DECORATION_SEED")) {
        config.decoration_seed = Some(seed);
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// CLI overrides, applied after [`load_config`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Export width override
    pub export_width: Option<u32>,

    /// Export scale override
    pub export_scale: Option<f32>,

    /// Decoration seed override
    pub decoration_seed: Option<u64>,
}

impl ConfigOverrides {
    /// Empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set export width override
    #[must_use]
    pub fn with_export_width(mut self, width: u32) -> Self {
        self.export_width = Some(width);
        self
    }

    /// Set export scale override
    #[must_use]
    pub fn with_export_scale(mut self, scale: f32) -> Self {
        self.export_scale = Some(scale);
        self
    }

    /// Set decoration seed override
    #[must_use]
    pub fn with_decoration_seed(mut self, seed: u64) -> Self {
        self.decoration_seed = Some(seed);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.export_width.is_none()
            && self.export_scale.is_none()
            && self.decoration_seed.is_none()
    }

    /// Apply overrides and re-validate
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is out of range.
    pub fn apply(&self, config: &mut KeepsakeConfig) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Ok(());
        }
        config.source = ConfigSource::Cli;

        if let Some(width) = self.export_width {
            config.render.export_width = width;
        }
        if let Some(scale) = self.export_scale {
            config.render.export_scale = scale;
        }
        if let Some(seed) = self.decoration_seed {
            config.decoration_seed = Some(seed);
        }
        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn parse(content: &str) -> KeepsakeConfig {
        let toml_config: KeepsakeToml = toml::from_str(content).unwrap();
        let mut config = KeepsakeConfig::default();
        apply_toml_config(&mut config, &toml_config);
        config
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = KeepsakeConfig::default();

        assert_eq!(config.render.export_width, 700);
        assert_eq!(config.render.export_scale, 2.0);
        assert_eq!(config.render.min_canvas, MIN_CANVAS);
        assert_eq!(config.watchdog_grace, DEFAULT_WATCHDOG_GRACE);
        assert_eq!(config.decoration, DecorationOdds::default());
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("keepsake/keepsake.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing
    // =========================================================================

    #[test]
    fn test_parse_full_toml() {
        let config = parse(
            r#"
[render]
export_width = 1080
export_scale = 3.0
preview_width = 400
min_canvas = 32

[choreography]
watchdog_grace_ms = 500

[decoration]
qr_chance = 1.0
sticker_chance = 0.0
max_stickers = 2
seal_rotation_max_deg = 5.0
background_chance = 0.1
seed = 42
"#,
        );

        assert_eq!(config.render.export_width, 1080);
        assert_eq!(config.render.export_scale, 3.0);
        assert_eq!(config.render.preview_width, 400);
        assert_eq!(config.render.min_canvas, 32);
        assert_eq!(config.watchdog_grace, Duration::from_millis(500));
        assert_eq!(config.decoration.qr_chance, 1.0);
        assert_eq!(config.decoration.max_stickers, 2);
        assert_eq!(config.decoration_seed, Some(42));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = parse("[render]\nexport_width = 500\n");
        assert_eq!(config.render.export_width, 500);
        assert_eq!(config.render.export_scale, 2.0);
        assert_eq!(config.decoration_seed, None);
    }

    #[test]
    fn test_load_from_file_sets_source() {
        let file = write_toml("[choreography]\nwatchdog_grace_ms = 750\n");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.watchdog_grace, Duration::from_millis(750));
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_missing_file_graceful() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(Some(dir.path().join("absent.toml"))).unwrap();
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[render\nexport_width = ");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_toml("[render]\nexport_scale = 0.5\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let file = write_toml("[decoration]\nqr_chance = 1.5\n");
        let err = load_config_from_path(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("qr_chance"));
    }

    // =========================================================================
    // Environment and CLI
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let mut config = parse("[render]\nexport_width = 500\n");
        let vars: HashMap<&str, &str> = [
            ("KEEPSAKE_EXPORT_WIDTH", "900"),
            ("KEEPSAKE_DECORATION_SEED", "7"),
            ("KEEPSAKE_EXPORT_SCALE", "not-a-number"),
        ]
        .into_iter()
        .collect();

        apply_env_config(&mut config, |key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.render.export_width, 900);
        assert_eq!(config.render.export_scale, 2.0);
        assert_eq!(config.decoration_seed, Some(7));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_no_env_keeps_source() {
        let mut config = KeepsakeConfig::default();
        apply_env_config(&mut config, |_| None);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_apply() {
        let mut config = KeepsakeConfig::default();
        ConfigOverrides::new()
            .with_export_width(320)
            .with_decoration_seed(9)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.render.export_width, 320);
        assert_eq!(config.decoration_seed, Some(9));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_no_change() {
        let mut config = KeepsakeConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_override_validated() {
        let mut config = KeepsakeConfig::default();
        let result = ConfigOverrides::new().with_export_width(0).apply(&mut config);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_export_rejected() {
        let mut config = KeepsakeConfig::default();
        let err = ConfigOverrides::new()
            .with_export_width(200_000)
            .apply(&mut config)
            .unwrap_err();
        assert!(err.to_string().contains("at most 8192 pixels"));

        // 4096 points at 2x is exactly the ceiling
        let mut config = KeepsakeConfig::default();
        ConfigOverrides::new()
            .with_export_width(4096)
            .apply(&mut config)
            .unwrap();

        let file = write_toml("[render]\nexport_width = 5000\nexport_scale = 2.0\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let file = write_toml("[render]\nmin_canvas = 10000\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_seeded_roller_from_config() {
        let mut config = KeepsakeConfig::default();
        config.decoration_seed = Some(3);
        let id = crate::model::RecordId::new();
        let date = chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let style = crate::model::ArtifactStyle::WaxEnvelope;
        assert_eq!(
            config.decoration_roller().roll(id, style, date),
            config.decoration_roller().roll(id, style, date)
        );
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
