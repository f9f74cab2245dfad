pub mod app_config;
pub mod automation;
pub mod config;
pub mod outputs;
pub mod permission;
pub mod point;
pub mod position;
pub mod srs;

pub use app_config::AppConfig;
pub use automation::Automation;
pub use config::{load_app_config, load_app_config_from_env};
pub use permission::Permission;
pub use point::{format_coord, is_valid_lat_lon, Point};
pub use position::Position;
pub use srs::Srs;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
