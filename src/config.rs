// config.rs - Centralized configuration system

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::{
    DEFAULT_BASE_CURRENCY, DEFAULT_FEE_RATE, DEFAULT_MIN_LIQUIDITY, DEFAULT_PAIRS,
    DEFAULT_PROFIT_THRESHOLD, DEFAULT_TICK_INTERVAL,
};

/// Global configuration singleton
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Returns a reference to the global configuration.
/// If not yet initialized, uses the default configuration.
pub fn get_config() -> &'static Config {
    CONFIG.get().unwrap_or_else(|| {
        static DEFAULT: OnceLock<Config> = OnceLock::new();
        DEFAULT.get_or_init(Config::default)
    })
}

/// Initializes configuration from the given file path.
pub fn init_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
    let config = Config::from_file(path)?;
    CONFIG
        .set(config)
        .map_err(|_| "Configuration already initialized".to_string())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub detection: DetectionConfig,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: String,
    pub metrics_interval_secs: u64,
    pub csv_flush_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionConfig {
    /// Currency every configured pair is quoted against, e.g. "USDT".
    pub base_currency: String,
    /// Per-trade fee in [0, 1).
    pub fee_rate: f64,
    /// Minimum price * size, in base currency units, for an edge to count.
    pub min_liquidity: f64,
    /// Net spread a cross-venue signal must strictly exceed.
    pub profit_threshold: f64,
    /// Detection loop cadence.
    pub tick_interval_ms: u64,
    /// Fixed pair universe; updates for anything else are dropped.
    pub pairs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureFlags {
    /// Drive the store from the built-in random-walk feed instead of real
    /// venue collaborators. For local runs and demos.
    pub enable_sim_feed: bool,
}

/// Default configuration used when no config file is provided.
pub static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(|| Config {
    general: GeneralConfig {
        log_level: String::from("info"),
        metrics_interval_secs: 10,
        csv_flush_interval_secs: 10,
    },
    detection: DetectionConfig {
        base_currency: DEFAULT_BASE_CURRENCY.to_string(),
        fee_rate: DEFAULT_FEE_RATE,
        min_liquidity: DEFAULT_MIN_LIQUIDITY,
        profit_threshold: DEFAULT_PROFIT_THRESHOLD,
        tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
        pairs: DEFAULT_PAIRS.iter().map(|s| s.to_string()).collect(),
    },
    features: FeatureFlags { enable_sim_feed: true },
});

impl Config {
    /// Returns the default configuration.
    pub fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }

    /// Returns a reference to the global configuration singleton.
    pub fn global() -> &'static OnceLock<Config> {
        &CONFIG
    }

    /// Load configuration from a file. The format is chosen by extension:
    /// TOML, JSON or YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file_format = path.as_ref().extension().and_then(|os| os.to_str());
        let mut file = File::open(path.as_ref())
            .map_err(|e| format!("Failed to open config file: {}", e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Config = match file_format {
            Some("toml") => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {:?}", e)),
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {:?}", e)),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {:?}", e)),
            _ => Err("Unsupported config file format".to_string()),
        }?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the detection math cannot work with.
    fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.detection.fee_rate) {
            return Err(format!(
                "fee_rate must be in [0, 1), got {}",
                self.detection.fee_rate
            ));
        }
        if self.detection.pairs.is_empty() {
            return Err("at least one pair must be configured".to_string());
        }
        if self.detection.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.base_currency, "USDT");
        assert!(config.detection.pairs.iter().all(|p| p.ends_with("USDT")));
    }

    #[test]
    fn toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.detection.pairs, config.detection.pairs);
        assert_eq!(parsed.detection.fee_rate, config.detection.fee_rate);
    }

    #[test]
    fn out_of_range_fee_is_rejected() {
        let mut config = Config::default();
        config.detection.fee_rate = 1.0;
        assert!(config.validate().is_err());
    }
}
