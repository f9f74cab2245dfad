use std::path::PathBuf;

use crate::automation::Automation;
use crate::permission::Permission;
use crate::point::Point;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub connection_permission: Permission,
    pub automation: Automation,
    pub automation_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub action_message_ms: u64,
    pub gpx_dir: PathBuf,
    pub open_command: String,
    pub device_location: Option<Point>,
}
