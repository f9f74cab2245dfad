use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::point::{is_valid_lat_lon, Point};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; a missing variable takes its default and a
/// present but malformed one is an error.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value(var, &or_default(var, default))
    };

    let log_level = or_default("GEOSHARE_LOG_LEVEL", "info");
    let connection_permission = parse_value(
        "GEOSHARE_CONNECTION_PERMISSION",
        &or_default("GEOSHARE_CONNECTION_PERMISSION", "ask"),
    )?;
    let automation = parse_value(
        "GEOSHARE_AUTOMATION",
        &or_default("GEOSHARE_AUTOMATION", "noop"),
    )?;
    let automation_delay_secs = parse_u64("GEOSHARE_AUTOMATION_DELAY_SECS", "5")?;

    let request_timeout_secs = parse_u64("GEOSHARE_REQUEST_TIMEOUT_SECS", "30")?;
    let connect_timeout_secs = parse_u64("GEOSHARE_CONNECT_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("GEOSHARE_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("GEOSHARE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("GEOSHARE_RETRY_BACKOFF_BASE_MS", "500")?;

    let action_message_ms = parse_u64("GEOSHARE_ACTION_MESSAGE_MS", "3000")?;
    let gpx_dir = or_default("GEOSHARE_GPX_DIR", ".").into();
    let open_command = or_default("GEOSHARE_OPEN_COMMAND", "xdg-open");
    let device_location = lookup("GEOSHARE_DEVICE_LOCATION")
        .ok()
        .map(|raw| parse_device_location(&raw))
        .transpose()?;

    Ok(AppConfig {
        log_level,
        connection_permission,
        automation,
        automation_delay_secs,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        action_message_ms,
        gpx_dir,
        open_command,
        device_location,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse `"LAT,LON"` into a point.
fn parse_device_location(raw: &str) -> Result<Point, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        var: "GEOSHARE_DEVICE_LOCATION".to_string(),
        reason: reason.to_string(),
    };
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected LAT,LON"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid("latitude is not a number"))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid("longitude is not a number"))?;
    if !is_valid_lat_lon(lat, lon) {
        return Err(invalid("coordinates out of range"));
    }
    Ok(Point::new(lat, lon))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
