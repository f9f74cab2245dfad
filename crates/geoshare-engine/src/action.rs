//! What happens after a successful conversion.
//!
//! An [`Action`] is the concrete effect built from the configured
//! [`Automation`]; [`ActionState`] sequences the optional delay, the location
//! rationale, the effect itself and the result message. Effects are carried
//! out by the caller through an [`ActionExecutor`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geoshare_core::{outputs, Automation, Point, Position};
use tokio_util::sync::CancellationToken;

use crate::location::LocationProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Noop,
    Copy {
        text: String,
    },
    /// Hand `uri` to an installed app.
    OpenApp {
        package: String,
        uri: String,
    },
    Share {
        text: String,
    },
    SaveGpx {
        file_name: String,
        contents: String,
    },
    /// A GPX route from the device location; becomes [`Action::SaveGpx`]
    /// once the location is known.
    SaveGpxRoute {
        file_name: String,
        position: Position,
    },
}

impl Action {
    /// Builds the effect of `automation` for `position`. Automations whose
    /// output can't be produced for this position fall back to
    /// [`Action::Noop`].
    #[must_use]
    pub fn from_automation(automation: &Automation, position: &Position, now: DateTime<Utc>) -> Self {
        let copy = |text: Option<String>| text.map_or(Self::Noop, |text| Self::Copy { text });
        match automation {
            Automation::Noop => Self::Noop,
            Automation::CopyCoordsDec => copy(outputs::coordinates_decimal(position)),
            Automation::CopyCoordsDms => copy(outputs::coordinates_degrees_minutes_seconds(position)),
            Automation::CopyGeoUri => copy(outputs::geo_uri(position)),
            Automation::CopyGoogleMapsUrl => copy(outputs::google_maps_url(position)),
            Automation::CopyGoogleMapsNavigateUrl => {
                copy(outputs::google_maps_navigation_url(position))
            }
            Automation::CopyAppleMapsUrl => copy(outputs::apple_maps_url(position)),
            Automation::CopyMagicEarthUrl => copy(outputs::magic_earth_url(position)),
            Automation::OpenApp(package) => outputs::geo_uri(position).map_or(Self::Noop, |uri| {
                Self::OpenApp {
                    package: package.clone(),
                    uri,
                }
            }),
            Automation::NavigateApp(package) => {
                let uri = if package.contains("magicearth") {
                    outputs::magic_earth_navigation_url(position)
                } else {
                    outputs::google_maps_navigation_url(position)
                };
                uri.map_or(Self::Noop, |uri| Self::OpenApp {
                    package: package.clone(),
                    uri,
                })
            }
            Automation::Share => outputs::geo_uri(position).map_or(Self::Noop, |text| Self::Share { text }),
            Automation::SaveGpx => outputs::gpx_waypoints(position, now).map_or(Self::Noop, |contents| {
                Self::SaveGpx {
                    file_name: gpx_file_name(now),
                    contents,
                }
            }),
            Automation::SaveGpxRoute if position.is_resolved() => Self::SaveGpxRoute {
                file_name: gpx_file_name(now),
                position: position.clone(),
            },
            Automation::SaveGpxRoute => Self::Noop,
        }
    }

    #[must_use]
    pub fn needs_location(&self) -> bool {
        matches!(self, Self::SaveGpxRoute { .. })
    }

    /// Resolves a location-dependent action against the device location.
    /// Returns `None` when no route can be built.
    #[must_use]
    pub fn with_location(self, location: &Point, now: DateTime<Utc>) -> Option<Self> {
        match self {
            Self::SaveGpxRoute {
                file_name,
                position,
            } => outputs::gpx_route(&position, location, now).map(|contents| Self::SaveGpx {
                file_name,
                contents,
            }),
            other => Some(other),
        }
    }

    #[must_use]
    pub fn success_message(&self) -> Option<String> {
        match self {
            Self::Copy { .. } => Some("Copied to clipboard".to_owned()),
            Self::SaveGpx { file_name, .. } | Self::SaveGpxRoute { file_name, .. } => {
                Some(format!("Saved {file_name}"))
            }
            Self::Noop | Self::OpenApp { .. } | Self::Share { .. } => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Noop => None,
            Self::Copy { .. } => Some("Failed to copy to clipboard".to_owned()),
            Self::OpenApp { package, .. } => Some(format!("Failed to open {package}")),
            Self::Share { .. } => Some("Failed to share".to_owned()),
            Self::SaveGpx { file_name, .. } | Self::SaveGpxRoute { file_name, .. } => {
                Some(format!("Failed to save {file_name}"))
            }
        }
    }
}

fn gpx_file_name(now: DateTime<Utc>) -> String {
    format!("geoshare-{}.gpx", now.format("%Y%m%d-%H%M%S"))
}

/// Performs an action's side effect and reports whether it worked.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: &Action) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionState {
    ActionWaiting {
        text: String,
        position: Position,
        action: Action,
        delay: Duration,
    },
    ActionReady {
        text: String,
        position: Position,
        action: Action,
    },
    LocationRationaleRequested {
        text: String,
        position: Position,
        action: Action,
    },
    LocationRationaleConfirmed {
        text: String,
        position: Position,
        action: Action,
    },
    LocationPermissionReceived {
        text: String,
        position: Position,
        action: Action,
    },
    LocationActionReady {
        text: String,
        position: Position,
        action: Action,
        location: Point,
    },
    BasicActionReady {
        text: String,
        position: Position,
        action: Action,
    },
    ActionRan {
        action: Action,
        success: bool,
    },
    ActionSucceeded {
        action: Action,
    },
    ActionFailed {
        action: Action,
    },
    ActionFinished,
}

impl ActionState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActionWaiting { .. } => "action-waiting",
            Self::ActionReady { .. } => "action-ready",
            Self::LocationRationaleRequested { .. } => "location-rationale-requested",
            Self::LocationRationaleConfirmed { .. } => "location-rationale-confirmed",
            Self::LocationPermissionReceived { .. } => "location-permission-received",
            Self::LocationActionReady { .. } => "location-action-ready",
            Self::BasicActionReady { .. } => "basic-action-ready",
            Self::ActionRan { .. } => "action-ran",
            Self::ActionSucceeded { .. } => "action-succeeded",
            Self::ActionFailed { .. } => "action-failed",
            Self::ActionFinished => "action-finished",
        }
    }

    /// The ready states, where the caller runs the effect.
    #[must_use]
    pub fn ready_action(&self) -> Option<&Action> {
        match self {
            Self::BasicActionReady { action, .. } | Self::LocationActionReady { action, .. } => {
                Some(action)
            }
            _ => None,
        }
    }
}

pub struct ActionContext<'a> {
    pub location: &'a dyn LocationProvider,
    /// How long a success or error message stays up.
    pub message_duration: Duration,
    pub cancel: CancellationToken,
    /// Timestamp for files built once the location is known.
    pub now: DateTime<Utc>,
}

/// First state for `automation` after a conversion produced `position`.
/// App automations wait `delay` first so the user can still cancel them.
#[must_use]
pub fn start(
    text: &str,
    position: &Position,
    automation: &Automation,
    delay: Duration,
    now: DateTime<Utc>,
) -> ActionState {
    let action = Action::from_automation(automation, position, now);
    if automation.is_delayed() && !delay.is_zero() && action != Action::Noop {
        ActionState::ActionWaiting {
            text: text.to_owned(),
            position: position.clone(),
            action,
            delay,
        }
    } else {
        ActionState::ActionReady {
            text: text.to_owned(),
            position: position.clone(),
            action,
        }
    }
}

/// Sleeps unless cancelled; `true` when the full duration elapsed.
async fn sleep_unless_cancelled(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

/// Computes the next state, or `None` when `state` is terminal or waits on
/// the caller.
pub async fn step(state: &ActionState, ctx: &ActionContext<'_>) -> Option<ActionState> {
    match state {
        ActionState::ActionWaiting {
            text,
            position,
            action,
            delay,
        } => Some(if sleep_unless_cancelled(*delay, &ctx.cancel).await {
            ActionState::ActionReady {
                text: text.clone(),
                position: position.clone(),
                action: action.clone(),
            }
        } else {
            tracing::debug!("automation cancelled while waiting");
            ActionState::ActionFinished
        }),

        ActionState::ActionReady {
            text,
            position,
            action,
        } => Some(if action.needs_location() {
            ActionState::LocationRationaleRequested {
                text: text.clone(),
                position: position.clone(),
                action: action.clone(),
            }
        } else {
            ActionState::BasicActionReady {
                text: text.clone(),
                position: position.clone(),
                action: action.clone(),
            }
        }),

        ActionState::LocationPermissionReceived {
            text,
            position,
            action,
        } => {
            let location = tokio::select! {
                biased;
                () = ctx.cancel.cancelled() => return Some(ActionState::ActionFinished),
                location = ctx.location.current_location() => location,
            };
            let resolved = location.as_ref().and_then(|location| {
                action
                    .clone()
                    .with_location(location, ctx.now)
                    .map(|resolved| (resolved, location.clone()))
            });
            Some(match resolved {
                Some((action, location)) => ActionState::LocationActionReady {
                    text: text.clone(),
                    position: position.clone(),
                    action,
                    location,
                },
                None => {
                    tracing::warn!("device location unavailable");
                    ActionState::ActionFailed {
                        action: action.clone(),
                    }
                }
            })
        }

        ActionState::ActionRan { action, success } => Some(match (action, success) {
            (Action::Noop, _) => ActionState::ActionFinished,
            (_, true) => ActionState::ActionSucceeded {
                action: action.clone(),
            },
            (_, false) => ActionState::ActionFailed {
                action: action.clone(),
            },
        }),

        ActionState::ActionSucceeded { action } => {
            if action.success_message().is_some() {
                sleep_unless_cancelled(ctx.message_duration, &ctx.cancel).await;
            }
            Some(ActionState::ActionFinished)
        }

        ActionState::ActionFailed { action } => {
            if action.error_message().is_some() {
                sleep_unless_cancelled(ctx.message_duration, &ctx.cancel).await;
            }
            Some(ActionState::ActionFinished)
        }

        ActionState::LocationRationaleRequested { .. }
        | ActionState::LocationRationaleConfirmed { .. }
        | ActionState::LocationActionReady { .. }
        | ActionState::BasicActionReady { .. }
        | ActionState::ActionFinished => None,
    }
}

/// The user accepted the explanation of why the location is needed.
#[must_use]
pub fn grant_location_rationale(state: &ActionState) -> Option<ActionState> {
    match state {
        ActionState::LocationRationaleRequested {
            text,
            position,
            action,
        } => Some(ActionState::LocationRationaleConfirmed {
            text: text.clone(),
            position: position.clone(),
            action: action.clone(),
        }),
        _ => None,
    }
}

/// The user declined to share the location; the action is dropped.
#[must_use]
pub fn deny_location_rationale(state: &ActionState) -> Option<ActionState> {
    match state {
        ActionState::LocationRationaleRequested { .. } => Some(ActionState::ActionFinished),
        _ => None,
    }
}

/// The platform granted access to the location.
#[must_use]
pub fn location_permission_received(state: &ActionState) -> Option<ActionState> {
    match state {
        ActionState::LocationRationaleConfirmed {
            text,
            position,
            action,
        } => Some(ActionState::LocationPermissionReceived {
            text: text.clone(),
            position: position.clone(),
            action: action.clone(),
        }),
        _ => None,
    }
}

/// Reports the outcome of the effect run for a ready state.
#[must_use]
pub fn action_ran(state: &ActionState, success: bool) -> Option<ActionState> {
    state.ready_action().map(|action| ActionState::ActionRan {
        action: action.clone(),
        success,
    })
}

/// Runs the effect of a ready state through `executor`.
pub async fn execute(state: &ActionState, executor: &dyn ActionExecutor) -> Option<ActionState> {
    let action = state.ready_action()?;
    let success = executor.execute(action).await;
    tracing::debug!(success, "action ran");
    action_ran(state, success)
}

/// Steps from `state` until a terminal state or one that waits on the caller.
pub async fn run(mut state: ActionState, ctx: &ActionContext<'_>) -> ActionState {
    while let Some(next) = step(&state, ctx).await {
        tracing::debug!(from = state.name(), to = next.name(), "action transition");
        state = next;
    }
    state
}

#[cfg(test)]
#[path = "action_test.rs"]
mod tests;
