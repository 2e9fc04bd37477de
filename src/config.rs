//! Layered configuration
//!
//! Defaults come from the section structs, overridable by `config/default.toml`,
//! an environment-specific file selected by `SHARPLINE_ENV`, and finally
//! `SHARPLINE__`-prefixed environment variables.

use crate::ensemble::EnsembleConfig;
use crate::models::rating::RatingConfig;
use crate::models::velocity::VelocityConfig;
use crate::review::ReviewConfig;
use crate::rules::RulesConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rating: RatingConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub velocity: VelocityConfig,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load and reject the result if any section fails validation
    pub fn load_validated() -> crate::error::Result<Self> {
        let config = Self::load()?;
        config
            .validate()
            .map_err(|errors| crate::error::SharplineError::Validation(errors.join("; ")))?;
        Ok(config)
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("review.max_retries", 2)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SHARPLINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SHARPLINE_RATING__K_FACTOR, etc.)
            .add_source(
                Environment::with_prefix("SHARPLINE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.rating.k_factor <= 0.0 {
            errors.push("rating.k_factor must be positive".to_string());
        }
        if self.rating.home_advantage < 0.0 {
            errors.push("rating.home_advantage cannot be negative".to_string());
        }
        if self.rating.elo_per_margin_point <= 0.0 {
            errors.push("rating.elo_per_margin_point must be positive".to_string());
        }
        if self.rating.default_rating <= 0.0 {
            errors.push("rating.default_rating must be positive".to_string());
        }

        if !(0.0..=100.0).contains(&self.rules.public_fade_pct) {
            errors.push("rules.public_fade_pct must be between 0 and 100".to_string());
        }
        if self.rules.rest_penalty_days == 0 {
            errors.push("rules.rest_penalty_days must be at least 1".to_string());
        }

        if self.velocity.steam_spread_per_hour <= 0.0 {
            errors.push("velocity.steam_spread_per_hour must be positive".to_string());
        }
        if self.velocity.steam_total_per_hour <= 0.0 {
            errors.push("velocity.steam_total_per_hour must be positive".to_string());
        }
        if self.velocity.late_window_hours <= 0.0 {
            errors.push("velocity.late_window_hours must be positive".to_string());
        }
        if self.velocity.late_move_points <= 0.0 {
            errors.push("velocity.late_move_points must be positive".to_string());
        }

        if !(0.5..1.0).contains(&self.ensemble.strong_bet_threshold) {
            errors.push("ensemble.strong_bet_threshold must be between 0.5 and 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
