use crate::error::{Result, RoadspanError};
use crate::models::RoadClass;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has at least the same precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() >= self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Nominal total length assumed per road class by the approximate tier.
///
/// This is a heuristic for roads without surveyed segments, not a measured
/// length. `None` disables the approximate tier for that class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NominalLengths {
    pub federal: Option<f64>,
    pub state: Option<f64>,
}

impl Default for NominalLengths {
    fn default() -> Self {
        Self { federal: Some(1000.0), state: None }
    }
}

impl NominalLengths {
    pub fn for_class(&self, class: RoadClass) -> Option<f64> {
        match class {
            RoadClass::Federal => self.federal,
            RoadClass::State => self.state,
        }
    }
}

/// Validated settings consumed by the resolution engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// EPSG code every output geometry is expressed in
    pub target_srid: u32,
    /// EPSG code assumed for geometries tagged 4326 whose coordinates are
    /// clearly not geographic
    pub assumed_source_srid: u32,
    /// Prefix of canonical federal road codes (`BR-`)
    pub federal_prefix: String,
    /// Zero-padding width of federal route numbers
    pub route_code_min_digits: usize,
    /// Separator between a road name and a branch suffix (`/`)
    pub branch_separator: String,
    /// How many neighbouring highways to log when a federal road is missing
    pub diagnostic_sample_size: usize,
    pub nominal_length_km: NominalLengths,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            target_srid: 4326,
            assumed_source_srid: 3857,
            federal_prefix: "BR-".to_string(),
            route_code_min_digits: 3,
            branch_separator: "/".to_string(),
            diagnostic_sample_size: 5,
            nominal_length_km: NominalLengths::default(),
        }
    }
}

impl ResolverSettings {
    pub fn nominal_length_for(&self, class: RoadClass) -> Option<f64> {
        self.nominal_length_km.for_class(class)
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.federal_prefix.trim().is_empty() {
            return Err(RoadspanError::ConfigInvalid {
                key: "federal_prefix".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }
        if !(1..=6).contains(&self.route_code_min_digits) {
            return Err(RoadspanError::ConfigInvalid {
                key: "route_code_min_digits".to_string(),
                reason: format!("must be between 1 and 6, got {}", self.route_code_min_digits),
            });
        }
        for (key, value) in [
            ("nominal_length_km.federal", self.nominal_length_km.federal),
            ("nominal_length_km.state", self.nominal_length_km.state),
        ] {
            if let Some(km) = value {
                if !km.is_finite() || km <= 0.0 {
                    return Err(RoadspanError::ConfigInvalid {
                        key: key.to_string(),
                        reason: format!("must be a positive number of kilometers, got {}", km),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Layered configuration for Roadspan
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub target_srid: ConfigValue<u32>,
    pub assumed_source_srid: ConfigValue<u32>,
    pub federal_prefix: ConfigValue<String>,
    pub route_code_min_digits: ConfigValue<usize>,
    pub branch_separator: ConfigValue<String>,
    pub diagnostic_sample_size: ConfigValue<usize>,
    pub federal_nominal_km: ConfigValue<Option<f64>>,
    pub state_nominal_km: ConfigValue<Option<f64>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = ResolverSettings::default();
        Self {
            target_srid: ConfigValue::new(defaults.target_srid, ConfigSource::Default),
            assumed_source_srid: ConfigValue::new(
                defaults.assumed_source_srid,
                ConfigSource::Default,
            ),
            federal_prefix: ConfigValue::new(defaults.federal_prefix, ConfigSource::Default),
            route_code_min_digits: ConfigValue::new(
                defaults.route_code_min_digits,
                ConfigSource::Default,
            ),
            branch_separator: ConfigValue::new(defaults.branch_separator, ConfigSource::Default),
            diagnostic_sample_size: ConfigValue::new(
                defaults.diagnostic_sample_size,
                ConfigSource::Default,
            ),
            federal_nominal_km: ConfigValue::new(
                defaults.nominal_length_km.federal,
                ConfigSource::Default,
            ),
            state_nominal_km: ConfigValue::new(
                defaults.nominal_length_km.state,
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| RoadspanError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| RoadspanError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(srid) = file_config.target_srid {
            self.target_srid.update(srid, ConfigSource::File);
        }

        if let Some(srid) = file_config.assumed_source_srid {
            self.assumed_source_srid.update(srid, ConfigSource::File);
        }

        if let Some(prefix) = file_config.federal_prefix {
            self.federal_prefix.update(prefix, ConfigSource::File);
        }

        if let Some(digits) = file_config.route_code_min_digits {
            self.route_code_min_digits.update(digits, ConfigSource::File);
        }

        if let Some(separator) = file_config.branch_separator {
            self.branch_separator.update(separator, ConfigSource::File);
        }

        if let Some(size) = file_config.diagnostic_sample_size {
            self.diagnostic_sample_size.update(size, ConfigSource::File);
        }

        if let Some(lengths) = file_config.nominal_length_km {
            if let Some(federal) = lengths.federal {
                self.federal_nominal_km.update(federal.into_option(), ConfigSource::File);
            }
            if let Some(state) = lengths.state {
                self.state_nominal_km.update(state.into_option(), ConfigSource::File);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // ROADSPAN_TARGET_SRID
        if let Ok(raw) = env::var("ROADSPAN_TARGET_SRID") {
            match parse_srid(&raw) {
                Ok(srid) => self.target_srid.update(srid, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ROADSPAN_TARGET_SRID value '{}': expected EPSG code",
                    raw
                ),
            }
        }

        // ROADSPAN_ASSUMED_SOURCE_SRID
        if let Ok(raw) = env::var("ROADSPAN_ASSUMED_SOURCE_SRID") {
            match parse_srid(&raw) {
                Ok(srid) => self.assumed_source_srid.update(srid, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ROADSPAN_ASSUMED_SOURCE_SRID value '{}': expected EPSG code",
                    raw
                ),
            }
        }

        // ROADSPAN_FEDERAL_PREFIX
        if let Ok(prefix) = env::var("ROADSPAN_FEDERAL_PREFIX") {
            self.federal_prefix.update(prefix, ConfigSource::Environment);
        }

        // ROADSPAN_ROUTE_CODE_MIN_DIGITS
        if let Ok(raw) = env::var("ROADSPAN_ROUTE_CODE_MIN_DIGITS") {
            match raw.trim().parse::<usize>() {
                Ok(digits) => self.route_code_min_digits.update(digits, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ROADSPAN_ROUTE_CODE_MIN_DIGITS value '{}': expected integer",
                    raw
                ),
            }
        }

        // ROADSPAN_BRANCH_SEPARATOR
        if let Ok(separator) = env::var("ROADSPAN_BRANCH_SEPARATOR") {
            self.branch_separator.update(separator, ConfigSource::Environment);
        }

        // ROADSPAN_DIAGNOSTIC_SAMPLE_SIZE
        if let Ok(raw) = env::var("ROADSPAN_DIAGNOSTIC_SAMPLE_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) => self.diagnostic_sample_size.update(size, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid ROADSPAN_DIAGNOSTIC_SAMPLE_SIZE value '{}': expected integer",
                    raw
                ),
            }
        }

        // ROADSPAN_FEDERAL_NOMINAL_KM / ROADSPAN_STATE_NOMINAL_KM
        for (var, target) in [
            ("ROADSPAN_FEDERAL_NOMINAL_KM", &mut self.federal_nominal_km),
            ("ROADSPAN_STATE_NOMINAL_KM", &mut self.state_nominal_km),
        ] {
            if let Ok(raw) = env::var(var) {
                match parse_nominal_length(&raw) {
                    Ok(length) => target.update(length, ConfigSource::Environment),
                    Err(_) => tracing::warn!(
                        "Invalid {} value '{}': expected kilometers or 'none'",
                        var,
                        raw
                    ),
                }
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(srid) = overrides.target_srid {
            self.target_srid.update(srid, ConfigSource::Cli);
        }

        if let Some(srid) = overrides.assumed_source_srid {
            self.assumed_source_srid.update(srid, ConfigSource::Cli);
        }

        if let Some(length) = overrides.federal_nominal_km {
            self.federal_nominal_km.update(length, ConfigSource::Cli);
        }

        if let Some(length) = overrides.state_nominal_km {
            self.state_nominal_km.update(length, ConfigSource::Cli);
        }
    }

    /// Snapshot the layered values into validated engine settings
    pub fn settings(&self) -> Result<ResolverSettings> {
        let settings = ResolverSettings {
            target_srid: self.target_srid.value,
            assumed_source_srid: self.assumed_source_srid.value,
            federal_prefix: self.federal_prefix.value.clone(),
            route_code_min_digits: self.route_code_min_digits.value,
            branch_separator: self.branch_separator.value.clone(),
            diagnostic_sample_size: self.diagnostic_sample_size.value,
            nominal_length_km: NominalLengths {
                federal: self.federal_nominal_km.value,
                state: self.state_nominal_km.value,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "target_srid".to_string(),
            (format!("EPSG:{}", self.target_srid.value), self.target_srid.source),
        );

        map.insert(
            "assumed_source_srid".to_string(),
            (format!("EPSG:{}", self.assumed_source_srid.value), self.assumed_source_srid.source),
        );

        map.insert(
            "federal_prefix".to_string(),
            (self.federal_prefix.value.clone(), self.federal_prefix.source),
        );

        map.insert(
            "route_code_min_digits".to_string(),
            (self.route_code_min_digits.value.to_string(), self.route_code_min_digits.source),
        );

        map.insert(
            "branch_separator".to_string(),
            (self.branch_separator.value.clone(), self.branch_separator.source),
        );

        map.insert(
            "diagnostic_sample_size".to_string(),
            (self.diagnostic_sample_size.value.to_string(), self.diagnostic_sample_size.source),
        );

        map.insert(
            "nominal_length_km.federal".to_string(),
            (format_length(self.federal_nominal_km.value), self.federal_nominal_km.source),
        );

        map.insert(
            "nominal_length_km.state".to_string(),
            (format_length(self.state_nominal_km.value), self.state_nominal_km.source),
        );

        map
    }
}

fn format_length(length: Option<f64>) -> String {
    match length {
        Some(km) => format!("{} km", km),
        None => "disabled".to_string(),
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    target_srid: Option<u32>,
    assumed_source_srid: Option<u32>,
    federal_prefix: Option<String>,
    route_code_min_digits: Option<usize>,
    branch_separator: Option<String>,
    diagnostic_sample_size: Option<usize>,
    nominal_length_km: Option<FileNominalLengths>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FileNominalLengths {
    federal: Option<FileLength>,
    state: Option<FileLength>,
}

/// A nominal length in a config file: a number, or `false` to disable
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum FileLength {
    Km(f64),
    Enabled(bool),
}

impl FileLength {
    fn into_option(self) -> Option<f64> {
        match self {
            FileLength::Km(km) => Some(km),
            FileLength::Enabled(_) => None,
        }
    }
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub target_srid: Option<u32>,
    pub assumed_source_srid: Option<u32>,
    pub federal_nominal_km: Option<Option<f64>>,
    pub state_nominal_km: Option<Option<f64>>,
}

/// Parse an EPSG code, accepting `4326` or `EPSG:4326`
pub fn parse_srid(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("EPSG:")
        .or_else(|| trimmed.strip_prefix("epsg:"))
        .unwrap_or(trimmed);
    digits.parse::<u32>().map_err(|_| RoadspanError::ConfigInvalid {
        key: "srid".to_string(),
        reason: format!("Invalid EPSG code: {}", s),
    })
}

/// Parse a nominal road length; `none`, `off` and `disabled` turn it off
pub fn parse_nominal_length(s: &str) -> Result<Option<f64>> {
    match s.trim().to_lowercase().as_str() {
        "none" | "off" | "disabled" => Ok(None),
        other => match other.parse::<f64>() {
            Ok(km) if km.is_finite() && km > 0.0 => Ok(Some(km)),
            _ => Err(RoadspanError::ConfigInvalid {
                key: "nominal_length_km".to_string(),
                reason: format!("Invalid nominal length: {}. Use kilometers or 'none'", s),
            }),
        },
    }
}
