//! The `convert` command: runs a conversion, prints the position and then
//! runs the configured automation.

use std::time::Duration;

use chrono::Utc;
use geoshare_core::{outputs, AppConfig, Position};
use geoshare_engine::{
    action, conversion, ActionContext, ActionState, ConversionContext, ConversionState,
    FixedLocation, HttpClient, MemoryPreferences, Preferences, RetryPolicy,
};
use tokio_util::sync::CancellationToken;

use crate::executor::CliExecutor;
use crate::prompt::{self, Answer};

/// Converts `text` and runs the automation on the result.
///
/// Returns `false` when the conversion or the automation failed.
///
/// # Errors
///
/// Returns an error if the HTTP client can't be built or the terminal
/// can't be read.
pub(crate) async fn run_convert(
    config: &AppConfig,
    text: &str,
    json: bool,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let client = HttpClient::new(config)?;
    let preferences = MemoryPreferences::from_config(config);
    let ctx = ConversionContext {
        client: &client,
        preferences: &preferences,
        retry: RetryPolicy::from_config(config),
        cancel: cancel.clone(),
    };

    let mut state = ConversionState::received(text, None);
    loop {
        state = conversion::run(state, &ctx).await;
        if !state.is_awaiting_permission() {
            break;
        }
        let Some(answer) = prompt::ask(&permission_question(&state), "[y/N/always/never]", &cancel).await?
        else {
            eprintln!("{}", conversion::FailureReason::Cancelled);
            return Ok(false);
        };
        let next = if answer.is_yes() {
            conversion::grant(&state, answer.remember(), &preferences)
        } else {
            conversion::deny(&state, answer.remember(), &preferences)
        };
        match next {
            Some(next) => state = next,
            None => break,
        }
    }

    let position = match state {
        ConversionState::ConversionSucceeded { position, .. } => position,
        ConversionState::ConversionFailed { reason, .. } => {
            eprintln!("{reason}");
            return Ok(false);
        }
        other => anyhow::bail!("conversion stopped in state {}", other.name()),
    };

    print_position(text, &position, json)?;
    run_automation(config, text, &position, &preferences, cancel).await
}

fn permission_question(state: &ConversionState) -> String {
    let service = state.input().map_or("the map service", |input| input.name);
    match state {
        ConversionState::RequestedUnshortenPermission { uri, .. } => {
            format!("Connect to {service} to resolve the short link {uri}?")
        }
        ConversionState::RequestedParseHtmlPermission { html_url, .. } => {
            format!("Connect to {service} to look up the location on {html_url}?")
        }
        _ => format!("Connect to {service}?"),
    }
}

pub(crate) fn format_position(position: &Position) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(coords) = outputs::coordinates_decimal(position) {
        lines.push(format!("Coordinates: {coords}"));
    }
    if let Some(dms) = outputs::coordinates_degrees_minutes_seconds(position) {
        lines.push(format!("DMS:         {dms}"));
    }
    if let Some(q) = &position.q {
        lines.push(format!("Query:       {q}"));
    }
    if let Some(name) = &position.name {
        lines.push(format!("Name:        {name}"));
    }
    if position.points.len() > 1 {
        lines.push(format!("Points:      {}", position.points.len()));
    }
    for (label, link) in [
        ("Geo URI:    ", outputs::geo_uri(position)),
        ("Google Maps:", outputs::google_maps_url(position)),
        ("Apple Maps: ", outputs::apple_maps_url(position)),
        ("Magic Earth:", outputs::magic_earth_url(position)),
    ] {
        if let Some(link) = link {
            lines.push(format!("{label} {link}"));
        }
    }
    lines
}

fn print_position(text: &str, position: &Position, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "input": text,
            "position": position,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for line in format_position(position) {
            println!("{line}");
        }
    }
    Ok(())
}

async fn run_automation(
    config: &AppConfig,
    text: &str,
    position: &Position,
    preferences: &MemoryPreferences,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let automation = preferences.automation();
    let location = FixedLocation(config.device_location.clone());
    let ctx = ActionContext {
        location: &location,
        message_duration: Duration::from_millis(config.action_message_ms),
        cancel: cancel.clone(),
        now: Utc::now(),
    };
    let executor = CliExecutor {
        open_command: config.open_command.clone(),
        gpx_dir: config.gpx_dir.clone(),
    };

    let mut succeeded = true;
    let mut state = action::start(
        text,
        position,
        &automation,
        Duration::from_secs(config.automation_delay_secs),
        Utc::now(),
    );
    loop {
        let next = match &state {
            ActionState::ActionWaiting { delay, .. } => {
                eprintln!(
                    "Running {automation} in {}s, press Ctrl-C to cancel",
                    delay.as_secs()
                );
                action::step(&state, &ctx).await
            }
            ActionState::LocationRationaleRequested { .. } => {
                let answer = prompt::ask(
                    "The route starts at your location. Use the configured device location?",
                    "[y/N]",
                    &cancel,
                )
                .await?;
                if answer.is_some_and(Answer::is_yes) {
                    action::grant_location_rationale(&state)
                } else {
                    action::deny_location_rationale(&state)
                }
            }
            ActionState::LocationRationaleConfirmed { .. } => {
                action::location_permission_received(&state)
            }
            ActionState::BasicActionReady { .. } | ActionState::LocationActionReady { .. } => {
                action::execute(&state, &executor).await
            }
            ActionState::ActionSucceeded { action } => {
                if let Some(message) = action.success_message() {
                    eprintln!("{message}");
                }
                action::step(&state, &ctx).await
            }
            ActionState::ActionFailed { action } => {
                succeeded = false;
                if let Some(message) = action.error_message() {
                    eprintln!("{message}");
                }
                action::step(&state, &ctx).await
            }
            _ => action::step(&state, &ctx).await,
        };
        match next {
            Some(next) => {
                tracing::debug!(from = state.name(), to = next.name(), "action transition");
                state = next;
            }
            None => break,
        }
    }
    Ok(succeeded)
}
