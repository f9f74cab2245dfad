use std::sync::{Mutex, PoisonError};

use geoshare_core::{AppConfig, Automation, Permission};

/// User choices the engine reads and, when asked to remember an answer,
/// writes back.
pub trait Preferences: Send + Sync {
    fn connection_permission(&self) -> Permission;
    fn set_connection_permission(&self, permission: Permission);
    fn automation(&self) -> Automation;
}

/// Preferences held in memory for the lifetime of the process.
#[derive(Debug)]
pub struct MemoryPreferences {
    connection_permission: Mutex<Permission>,
    automation: Mutex<Automation>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new(connection_permission: Permission, automation: Automation) -> Self {
        Self {
            connection_permission: Mutex::new(connection_permission),
            automation: Mutex::new(automation),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.connection_permission, config.automation.clone())
    }
}

impl Default for MemoryPreferences {
    fn default() -> Self {
        Self::new(Permission::Ask, Automation::Noop)
    }
}

impl Preferences for MemoryPreferences {
    fn connection_permission(&self) -> Permission {
        *self
            .connection_permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_connection_permission(&self, permission: Permission) {
        tracing::debug!(%permission, "remembering connection permission");
        *self
            .connection_permission
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = permission;
    }

    fn automation(&self) -> Automation {
        self.automation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
