//! Runtime configuration read from the environment
//!
//! Binaries call `dotenv::dotenv()` first, so a local `.env` file feeds the
//! same variables.

use crate::error::{CopilotError, Result};
use crate::fallback::FallbackPolicy;
use std::path::PathBuf;

pub const DEFAULT_FIXTURES_DIR: &str = "fixtures";
pub const DEFAULT_API_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct CopilotConfig {
    /// Directory holding actuals/budget/fx/cash CSV files
    pub fixtures_dir: PathBuf,
    pub api_port: u16,
    pub strict_fallback: bool,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            api_port: DEFAULT_API_PORT,
            strict_fallback: false,
        }
    }
}

impl CopilotConfig {
    /// Reads `CFO_FIXTURES_PATH`, `PORT` (or `API_PORT`) and `CFO_STRICT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fixtures_dir = lookup("CFO_FIXTURES_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURES_DIR));

        let api_port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| CopilotError::ConfigError(format!("invalid port '{}': {}", raw, e)))?,
            None => DEFAULT_API_PORT,
        };

        let strict_fallback = lookup("CFO_STRICT")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            fixtures_dir,
            api_port,
            strict_fallback,
        })
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        if self.strict_fallback {
            FallbackPolicy::Strict
        } else {
            FallbackPolicy::Plausible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CopilotConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, CopilotConfig::default());
        assert_eq!(config.fallback_policy(), FallbackPolicy::Plausible);
    }

    #[test]
    fn test_overrides() {
        let config = CopilotConfig::from_lookup(lookup(&[
            ("CFO_FIXTURES_PATH", "/data/finance"),
            ("API_PORT", "9090"),
            ("CFO_STRICT", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.fixtures_dir, PathBuf::from("/data/finance"));
        assert_eq!(config.api_port, 9090);
        assert_eq!(config.fallback_policy(), FallbackPolicy::Strict);
    }

    #[test]
    fn test_port_takes_precedence() {
        let config =
            CopilotConfig::from_lookup(lookup(&[("PORT", "3000"), ("API_PORT", "9090")])).unwrap();
        assert_eq!(config.api_port, 3000);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = CopilotConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, CopilotError::ConfigError(_)));
    }
}
