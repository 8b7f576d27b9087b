//! # Ledger Configuration
//!
//! Loaded from a TOML file or from `QC_LEDGER_*` environment variables.
//! Amounts in the file are human units: whole tokens for supply figures,
//! decimal strings for prices.
//!
//! ```toml
//! [token]
//! name = "MyToken"
//! symbol = "MTK"
//! decimals = 18
//! total_supply = 1000000
//! initial_allocation = 110000
//! price = "0.01"
//! mint_rate = 1000
//! owner = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4"
//! # admin defaults to owner
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{
    parse_units, unit_scale, Address, LedgerParams, TokenMetadata, DEFAULT_DECIMALS,
    MAX_DECIMALS,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("owner address is not configured")]
    MissingOwner,
}

/// Complete ledger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub token: TokenConfig,
    pub logging: LoggingConfig,
}

/// Token parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Whole tokens.
    pub total_supply: u64,
    /// Whole tokens credited to the owner at creation.
    pub initial_allocation: u64,
    /// Decimal string in payment units, e.g. `"0.01"`.
    pub price: String,
    pub mint_rate: u64,
    pub owner: Option<String>,
    pub admin: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "MyToken".to_string(),
            symbol: "MTK".to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: 1_000_000,
            initial_allocation: 110_000,
            price: "0.01".to_string(),
            mint_rate: 1000,
            owner: None,
            admin: None,
        }
    }
}

/// Logging output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_LEDGER_NAME`, `QC_LEDGER_SYMBOL`, `QC_LEDGER_DECIMALS`
    /// - `QC_LEDGER_TOTAL_SUPPLY`, `QC_LEDGER_INITIAL_ALLOCATION` (whole tokens)
    /// - `QC_LEDGER_PRICE` (decimal string), `QC_LEDGER_MINT_RATE`
    /// - `QC_LEDGER_OWNER`, `QC_LEDGER_ADMIN` (0x-hex addresses)
    /// - `QC_LOG_LEVEL` or `RUST_LOG`: log level (default: info)
    /// - `QC_JSON_LOGS`: JSON log output (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = TokenConfig::default();

        let token = TokenConfig {
            name: lookup("QC_LEDGER_NAME").unwrap_or(defaults.name),
            symbol: lookup("QC_LEDGER_SYMBOL").unwrap_or(defaults.symbol),
            decimals: parse_var(&lookup, "QC_LEDGER_DECIMALS", "decimals")?
                .unwrap_or(defaults.decimals),
            total_supply: parse_var(&lookup, "QC_LEDGER_TOTAL_SUPPLY", "total_supply")?
                .unwrap_or(defaults.total_supply),
            initial_allocation: parse_var(
                &lookup,
                "QC_LEDGER_INITIAL_ALLOCATION",
                "initial_allocation",
            )?
            .unwrap_or(defaults.initial_allocation),
            price: lookup("QC_LEDGER_PRICE").unwrap_or(defaults.price),
            mint_rate: parse_var(&lookup, "QC_LEDGER_MINT_RATE", "mint_rate")?
                .unwrap_or(defaults.mint_rate),
            owner: lookup("QC_LEDGER_OWNER"),
            admin: lookup("QC_LEDGER_ADMIN"),
        };

        let logging = LoggingConfig {
            level: lookup("QC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
            json: lookup("QC_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        };

        Ok(Self { token, logging })
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_params().map(|_| ())
    }

    /// Check the configuration and convert it into ledger parameters.
    pub fn to_params(&self) -> Result<LedgerParams, ConfigError> {
        let token = &self.token;

        if token.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                field: "decimals",
                reason: format!("must be at most {MAX_DECIMALS}"),
            });
        }
        let scale = unit_scale(token.decimals).ok_or(ConfigError::Invalid {
            field: "decimals",
            reason: "scale overflows".to_string(),
        })?;

        let whole_to_units = |whole: u64, field: &'static str| {
            u128::from(whole)
                .checked_mul(scale)
                .ok_or_else(|| ConfigError::Invalid {
                    field,
                    reason: "overflows at this precision".to_string(),
                })
        };
        let total_supply = whole_to_units(token.total_supply, "total_supply")?;
        let initial_allocation = whole_to_units(token.initial_allocation, "initial_allocation")?;
        if initial_allocation > total_supply {
            return Err(ConfigError::Invalid {
                field: "initial_allocation",
                reason: "exceeds total_supply".to_string(),
            });
        }

        let price = parse_units(&token.price, DEFAULT_DECIMALS).map_err(|e| {
            ConfigError::Invalid {
                field: "price",
                reason: e.to_string(),
            }
        })?;

        let owner = token.owner.as_deref().ok_or(ConfigError::MissingOwner)?;
        let owner = parse_address(owner, "owner")?;
        let admin = token
            .admin
            .as_deref()
            .map(|a| parse_address(a, "admin"))
            .transpose()?;

        Ok(LedgerParams {
            owner,
            admin,
            metadata: TokenMetadata {
                name: token.name.clone(),
                symbol: token.symbol.clone(),
                decimals: token.decimals,
            },
            total_supply,
            initial_allocation,
            price,
            mint_rate: u128::from(token.mint_rate),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, field: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                field,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_address(raw: &str, field: &'static str) -> Result<Address, ConfigError> {
    let address: Address = raw.parse().map_err(|e: crate::domain::LedgerError| {
        ConfigError::Invalid {
            field,
            reason: e.to_string(),
        }
    })?;
    if address.is_zero() {
        return Err(ConfigError::Invalid {
            field,
            reason: "zero address".to_string(),
        });
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tokens;
    use std::collections::HashMap;
    use std::io::Write;

    const OWNER_HEX: &str = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4";

    #[test]
    fn test_parse_full_file() {
        let config = LedgerConfig::parse(&format!(
            r#"
            [token]
            name = "Quantum"
            symbol = "QNT"
            decimals = 18
            total_supply = 500
            initial_allocation = 10
            price = "0.002"
            mint_rate = 5
            owner = "{OWNER_HEX}"

            [logging]
            level = "debug"
            json = true
            "#
        ))
        .unwrap();

        assert_eq!(config.token.symbol, "QNT");
        assert!(config.logging.json);

        let params = config.to_params().unwrap();
        assert_eq!(params.total_supply, tokens(500));
        assert_eq!(params.initial_allocation, tokens(10));
        assert_eq!(params.price, 2_000_000_000_000_000);
        assert_eq!(params.mint_rate, 5);
        assert_eq!(params.admin, None);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = LedgerConfig::parse(&format!("[token]\nowner = \"{OWNER_HEX}\"\n")).unwrap();
        let params = config.to_params().unwrap();

        assert_eq!(params.metadata, TokenMetadata::default());
        assert_eq!(params.total_supply, tokens(1_000_000));
        assert_eq!(params.initial_allocation, tokens(110_000));
        assert_eq!(params.mint_rate, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_owner_required() {
        let err = LedgerConfig::default().to_params().unwrap_err();
        assert!(matches!(err, ConfigError::MissingOwner));
    }

    #[test]
    fn test_allocation_above_supply_rejected() {
        let mut config = LedgerConfig::default();
        config.token.owner = Some(OWNER_HEX.to_string());
        config.token.initial_allocation = config.token.total_supply + 1;

        assert!(matches!(
            config.to_params(),
            Err(ConfigError::Invalid {
                field: "initial_allocation",
                ..
            })
        ));
    }

    #[test]
    fn test_excessive_decimals_rejected() {
        let mut config = LedgerConfig::default();
        config.token.owner = Some(OWNER_HEX.to_string());
        config.token.decimals = 39;

        assert!(matches!(
            config.to_params(),
            Err(ConfigError::Invalid {
                field: "decimals",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_owner_rejected() {
        let mut config = LedgerConfig::default();
        config.token.owner = Some(format!("0x{}", "0".repeat(40)));
        assert!(matches!(
            config.to_params(),
            Err(ConfigError::Invalid { field: "owner", .. })
        ));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("QC_LEDGER_SYMBOL", "ENV"),
            ("QC_LEDGER_TOTAL_SUPPLY", "42"),
            ("QC_LEDGER_OWNER", OWNER_HEX),
            ("RUST_LOG", "warn"),
            ("QC_JSON_LOGS", "1"),
        ]
        .into_iter()
        .collect();

        let config =
            LedgerConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.token.symbol, "ENV");
        assert_eq!(config.token.name, "MyToken");
        assert_eq!(config.token.total_supply, 42);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let err = LedgerConfig::from_lookup(|key| {
            (key == "QC_LEDGER_DECIMALS").then(|| "eighteen".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "decimals", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[token]\nowner = \"{OWNER_HEX}\"\nsymbol = \"FILE\"").unwrap();

        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.token.symbol, "FILE");
    }

    #[test]
    fn test_load_missing_file() {
        let err = LedgerConfig::load("/nonexistent/ledger.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
