use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

/// Valuation knobs used by the projection engine. Local values act as
/// defaults; the record store's `/config` endpoint overrides them when
/// present.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ValuationSettings {
    /// Minimum acceptable dividend yield; the price ceiling pays
    /// exactly this yield on the projected dividend.
    #[serde(default = "default_required_yield")]
    pub required_yield: f64,
    /// Margin of safety at or above which a company rates Buy.
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,
    /// Margin of safety below which a company rates Sell.
    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: f64,
}

fn default_required_yield() -> f64 {
    0.08
}

fn default_buy_threshold() -> f64 {
    0.20
}

fn default_sell_threshold() -> f64 {
    0.0
}

impl Default for ValuationSettings {
    fn default() -> Self {
        ValuationSettings {
            required_yield: default_required_yield(),
            buy_threshold: default_buy_threshold(),
            sell_threshold: default_sell_threshold(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub valuation: ValuationSettings,
    /// Quote cache lifetime in seconds.
    #[serde(default = "default_quote_ttl_secs")]
    pub quote_ttl_secs: u64,
    pub data_path: Option<String>,
}

fn default_quote_ttl_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "divtrack", "divtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "divtrack", "divtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api:
  base_url: "http://records.internal:8000"
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
valuation:
  required_yield: 0.06
  buy_threshold: 0.25
quote_ttl_secs: 120
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "http://records.internal:8000");
        assert_eq!(
            config.providers.yahoo.unwrap().base_url,
            "http://example.com/yahoo"
        );
        assert_eq!(config.valuation.required_yield, 0.06);
        assert_eq!(config.valuation.buy_threshold, 0.25);
        // Unset threshold falls back to its default.
        assert_eq!(config.valuation.sell_threshold, 0.0);
        assert_eq!(config.quote_ttl_secs, 120);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~").expect("Failed to parse");
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(config.providers.yahoo.is_some());
        assert_eq!(config.valuation, ValuationSettings::default());
        assert_eq!(config.quote_ttl_secs, 60);
    }
}
