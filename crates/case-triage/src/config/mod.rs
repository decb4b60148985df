use std::env;
use std::fmt;

use crate::cases::DEFAULT_LIST_LIMIT;
use crate::catalog::IndicatorCatalog;
use crate::scoring::{CombinationStrategy, PriorityScorer};

const DEFAULT_SEED_CASES: usize = 50;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub listing: ListingConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let combination_mode = match env::var("TRIAGE_COMBINATION_MODE") {
            Ok(raw) => CombinationMode::parse(&raw)
                .ok_or(ConfigError::InvalidCombinationMode(raw))?,
            Err(_) => CombinationMode::default(),
        };

        let default_limit = match env::var("TRIAGE_LIST_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidListLimit)?,
            Err(_) => DEFAULT_LIST_LIMIT,
        };

        let case_count = match env::var("TRIAGE_SEED_CASES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidSeedCount)?,
            Err(_) => DEFAULT_SEED_CASES,
        };

        let rng_seed = match env::var("TRIAGE_RNG_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidRngSeed)?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig { combination_mode },
            listing: ListingConfig { default_limit },
            seed: SeedConfig {
                case_count,
                rng_seed,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// How combination bonuses are detected when scoring cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombinationMode {
    /// Indicator-count threshold, matching scores persisted by the legacy ranking service.
    #[default]
    Count,
    /// Require the named indicators of a combination to be attached.
    Named,
}

impl CombinationMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "count" | "legacy" => Some(Self::Count),
            "named" | "identity" => Some(Self::Named),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    pub combination_mode: CombinationMode,
}

impl ScoringConfig {
    /// Build the scorer for the configured mode. Named mode resolves combination members
    /// against `catalog` once, up front.
    pub fn scorer(&self, catalog: &IndicatorCatalog) -> PriorityScorer {
        let strategy = match self.combination_mode {
            CombinationMode::Count => CombinationStrategy::IndicatorCount,
            CombinationMode::Named => {
                CombinationStrategy::NamedIndicators(catalog.resolve_combinations())
            }
        };
        PriorityScorer::new(strategy)
    }
}

/// Dashboard listing defaults.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub default_limit: usize,
}

/// Synthetic case generation for demos and local testing.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub case_count: usize,
    pub rng_seed: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidCombinationMode(String),
    InvalidListLimit,
    InvalidSeedCount,
    InvalidRngSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCombinationMode(value) => write!(
                f,
                "TRIAGE_COMBINATION_MODE must be 'count' or 'named' (got '{}')",
                value
            ),
            ConfigError::InvalidListLimit => {
                write!(f, "TRIAGE_LIST_LIMIT must be a positive integer")
            }
            ConfigError::InvalidSeedCount => {
                write!(f, "TRIAGE_SEED_CASES must be a non-negative integer")
            }
            ConfigError::InvalidRngSeed => write!(f, "TRIAGE_RNG_SEED must be a valid u64"),
        }
    }
}

impl std::error::Error for ConfigError {}
