//! Application configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! through `dotenvy`). Command-line flags override them.
//!
//! | Variable             | Default | Meaning                              |
//! |----------------------|---------|--------------------------------------|
//! | `INFLUENCE_PORT`     | `3000`  | HTTP server port                     |
//! | `INFLUENCE_CURRENCY` | `₹`     | Currency symbol in text output       |
//! | `INFLUENCE_TOP_N`    | `10`    | Rows in the "top influencers" table  |

use serde::{Deserialize, Serialize};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default currency symbol.
pub const DEFAULT_CURRENCY: &str = "₹";

/// Default size of the top-influencers table.
pub const DEFAULT_TOP_N: usize = 10;

/// Maximum accepted upload size per request (in bytes).
///
/// 20 MB limit.
pub const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub currency: String,
    pub top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            currency: DEFAULT_CURRENCY.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Unparsable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("INFLUENCE_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            currency: lookup("INFLUENCE_CURRENCY")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.currency),
            top_n: lookup("INFLUENCE_TOP_N")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.top_n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.currency, "₹");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("INFLUENCE_PORT", "8080"),
            ("INFLUENCE_CURRENCY", "$"),
            ("INFLUENCE_TOP_N", "5"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.port, 8080);
        assert_eq!(config.currency, "$");
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_lookup(|k| match k {
            "INFLUENCE_PORT" => Some("not-a-port".into()),
            "INFLUENCE_CURRENCY" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.currency, DEFAULT_CURRENCY);
    }
}
