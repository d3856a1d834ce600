pub mod app_config;
pub mod config;
pub mod geo;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, IndexStrategy, StoreBackend};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    clock_hhmm, sort_by_coordinate, Candidate, CoordinateEntry, EligibilityMap,
    EligibilitySchedule, Restaurant,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
