//! The conversion pipeline as an explicit state machine.
//!
//! [`step`] computes the single next state; it returns `None` for terminal
//! states and for states that wait on the user ([`grant`] / [`deny`]).
//! Retry counters travel inside the states, so every transition can be
//! replayed from its input alone.

use geoshare_core::{Permission, Position};
use geoshare_inputs::{find_uri, Input, ShortUriMethod, Uri};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::error::NetworkError;
use crate::network::{resolve_against, NetworkClient};
use crate::preferences::Preferences;
use crate::retry::RetryPolicy;

/// Why a conversion ended in [`ConversionState::ConversionFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("Missing map link")]
    MissingUrl,
    #[error("Unsupported map link")]
    UnsupportedService,
    #[error("Cancelled")]
    Cancelled,
    #[error("Failed to resolve the short link")]
    UnshortenError,
    #[error("Resolving the short link timed out")]
    UnshortenTimeout,
    #[error("Connecting to the map service is not permitted")]
    ConnectionPermissionDenied,
    #[error("Failed to find a location in the map link")]
    ParseUrlError,
    #[error("Failed to find a location on the map service's page")]
    ParseHtmlError,
    #[error("Failed to load the map service's page")]
    HtmlConnectionError,
    #[error("Loading the map service's page timed out")]
    HtmlTimeout,
}

#[derive(Debug, Clone)]
pub enum ConversionState {
    Initial,
    ReceivedUriString {
        input_text: String,
        permission: Option<Permission>,
    },
    ReceivedUri {
        input_text: String,
        input: &'static Input,
        uri: Uri,
        permission: Option<Permission>,
        /// Links already followed from scraped pages.
        redirects: u32,
    },
    RequestedUnshortenPermission {
        input_text: String,
        input: &'static Input,
        uri: Uri,
        redirects: u32,
    },
    GrantedUnshortenPermission {
        input_text: String,
        input: &'static Input,
        uri: Uri,
        retry: u32,
        redirects: u32,
    },
    DeniedConnectionPermission {
        input_text: String,
    },
    UnshortenedUrl {
        input_text: String,
        input: &'static Input,
        uri: Uri,
        permission: Option<Permission>,
        redirects: u32,
    },
    RequestedParseHtmlPermission {
        input_text: String,
        input: &'static Input,
        html_url: String,
        position: Position,
        redirects: u32,
    },
    GrantedParseHtmlPermission {
        input_text: String,
        input: &'static Input,
        html_url: String,
        position: Position,
        retry: u32,
        redirects: u32,
    },
    ParseHtmlFailed {
        input_text: String,
        position: Position,
    },
    ConversionSucceeded {
        input_text: String,
        position: Position,
    },
    ConversionFailed {
        reason: FailureReason,
        input_text: String,
    },
}

impl ConversionState {
    /// Entry point for a piece of shared text. `permission` overrides the
    /// stored connection permission for this conversion only.
    #[must_use]
    pub fn received(input_text: impl Into<String>, permission: Option<Permission>) -> Self {
        Self::ReceivedUriString {
            input_text: input_text.into(),
            permission,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::ReceivedUriString { .. } => "received-uri-string",
            Self::ReceivedUri { .. } => "received-uri",
            Self::RequestedUnshortenPermission { .. } => "requested-unshorten-permission",
            Self::GrantedUnshortenPermission { .. } => "granted-unshorten-permission",
            Self::DeniedConnectionPermission { .. } => "denied-connection-permission",
            Self::UnshortenedUrl { .. } => "unshortened-url",
            Self::RequestedParseHtmlPermission { .. } => "requested-parse-html-permission",
            Self::GrantedParseHtmlPermission { .. } => "granted-parse-html-permission",
            Self::ParseHtmlFailed { .. } => "parse-html-failed",
            Self::ConversionSucceeded { .. } => "conversion-succeeded",
            Self::ConversionFailed { .. } => "conversion-failed",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Initial | Self::ConversionSucceeded { .. } | Self::ConversionFailed { .. }
        )
    }

    /// `true` for the states that wait on [`grant`] or [`deny`].
    #[must_use]
    pub fn is_awaiting_permission(&self) -> bool {
        matches!(
            self,
            Self::RequestedUnshortenPermission { .. } | Self::RequestedParseHtmlPermission { .. }
        )
    }

    /// The service a permission prompt should name, if the state has one.
    #[must_use]
    pub fn input(&self) -> Option<&'static Input> {
        match self {
            Self::ReceivedUri { input, .. }
            | Self::RequestedUnshortenPermission { input, .. }
            | Self::GrantedUnshortenPermission { input, .. }
            | Self::UnshortenedUrl { input, .. }
            | Self::RequestedParseHtmlPermission { input, .. }
            | Self::GrantedParseHtmlPermission { input, .. } => Some(*input),
            _ => None,
        }
    }
}

/// Links followed from scraped pages before giving up on the page.
pub const MAX_PAGE_REDIRECTS: u32 = 3;

/// Everything a transition may touch besides the state itself.
pub struct ConversionContext<'a> {
    pub client: &'a dyn NetworkClient,
    pub preferences: &'a dyn Preferences,
    pub retry: RetryPolicy,
    pub cancel: CancellationToken,
}

fn failed(reason: FailureReason, input_text: &str) -> ConversionState {
    ConversionState::ConversionFailed {
        reason,
        input_text: input_text.to_owned(),
    }
}

/// Computes the next state, or `None` when `state` is terminal or waits on
/// the user.
pub async fn step(state: &ConversionState, ctx: &ConversionContext<'_>) -> Option<ConversionState> {
    match state {
        ConversionState::Initial
        | ConversionState::RequestedUnshortenPermission { .. }
        | ConversionState::RequestedParseHtmlPermission { .. }
        | ConversionState::ConversionSucceeded { .. }
        | ConversionState::ConversionFailed { .. } => None,

        ConversionState::ReceivedUriString {
            input_text,
            permission,
        } => Some(received_uri_string(input_text, *permission)),

        ConversionState::ReceivedUri {
            input_text,
            input,
            uri,
            permission,
            redirects,
        } => Some(received_uri(input_text, *input, uri, *permission, *redirects, ctx)),

        ConversionState::GrantedUnshortenPermission {
            input_text,
            input,
            uri,
            retry,
            redirects,
        } => Some(unshorten(input_text, *input, uri, *retry, *redirects, ctx).await),

        ConversionState::DeniedConnectionPermission { input_text } => Some(failed(
            FailureReason::ConnectionPermissionDenied,
            input_text,
        )),

        ConversionState::UnshortenedUrl {
            input_text,
            input,
            uri,
            permission,
            redirects,
        } => Some(unshortened_url(input_text, *input, uri, *permission, *redirects, ctx)),

        ConversionState::GrantedParseHtmlPermission {
            input_text,
            input,
            html_url,
            position,
            retry,
            redirects,
        } => Some(
            parse_html(input_text, *input, html_url, position, *retry, *redirects, ctx).await,
        ),

        ConversionState::ParseHtmlFailed {
            input_text,
            position,
        } => Some(if position.q.is_some() {
            ConversionState::ConversionSucceeded {
                input_text: input_text.clone(),
                position: position.clone(),
            }
        } else {
            failed(FailureReason::ParseHtmlError, input_text)
        }),
    }
}

fn received_uri_string(input_text: &str, permission: Option<Permission>) -> ConversionState {
    if input_text.trim().is_empty() {
        return failed(FailureReason::MissingUrl, input_text);
    }
    match find_uri(input_text) {
        Some((input, uri)) => ConversionState::ReceivedUri {
            input_text: input_text.to_owned(),
            input,
            uri,
            permission,
            redirects: 0,
        },
        None => failed(FailureReason::UnsupportedService, input_text),
    }
}

fn received_uri(
    input_text: &str,
    input: &'static Input,
    uri: &Uri,
    permission: Option<Permission>,
    redirects: u32,
    ctx: &ConversionContext<'_>,
) -> ConversionState {
    if !input.is_short_uri(uri) {
        return ConversionState::UnshortenedUrl {
            input_text: input_text.to_owned(),
            input,
            uri: uri.clone(),
            permission,
            redirects,
        };
    }
    match permission.unwrap_or_else(|| ctx.preferences.connection_permission()) {
        Permission::Always => ConversionState::GrantedUnshortenPermission {
            input_text: input_text.to_owned(),
            input,
            uri: uri.clone(),
            retry: 0,
            redirects,
        },
        Permission::Ask => ConversionState::RequestedUnshortenPermission {
            input_text: input_text.to_owned(),
            input,
            uri: uri.clone(),
            redirects,
        },
        Permission::Never => ConversionState::DeniedConnectionPermission {
            input_text: input_text.to_owned(),
        },
    }
}

/// Runs `request` unless the conversion is cancelled first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    request: impl std::future::Future<Output = Result<T, NetworkError>>,
) -> Result<T, NetworkError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(NetworkError::Cancelled),
        result = request => result,
    }
}

async fn unshorten(
    input_text: &str,
    input: &'static Input,
    uri: &Uri,
    retry: u32,
    redirects: u32,
    ctx: &ConversionContext<'_>,
) -> ConversionState {
    if retry > 0 && ctx.retry.wait(retry, &ctx.cancel).await.is_err() {
        return failed(FailureReason::Cancelled, input_text);
    }
    let method = input.short_uri_method().unwrap_or(ShortUriMethod::Head);
    let result = cancellable(
        &ctx.cancel,
        ctx.client.resolve_redirect(uri.as_str(), method, retry),
    )
    .await;

    match result {
        Ok(location) => match Uri::parse(&location) {
            Some(resolved) => {
                tracing::debug!(input = %input.id, from = %uri, to = %resolved, "short link resolved");
                ConversionState::UnshortenedUrl {
                    input_text: input_text.to_owned(),
                    input,
                    uri: resolved,
                    permission: Some(Permission::Always),
                    redirects,
                }
            }
            None => failed(FailureReason::UnshortenError, input_text),
        },
        Err(err) if err.is_recoverable() && ctx.retry.can_retry(retry) => {
            tracing::warn!(
                input = %input.id,
                retry = retry + 1,
                max_retries = ctx.retry.max_retries,
                error = %err,
                "short link timed out, retrying"
            );
            ConversionState::GrantedUnshortenPermission {
                input_text: input_text.to_owned(),
                input,
                uri: uri.clone(),
                retry: retry + 1,
                redirects,
            }
        }
        Err(err) => {
            let err = err.exhausted();
            tracing::warn!(input = %input.id, error = %err, "short link failed");
            let reason = match err {
                NetworkError::Cancelled => FailureReason::Cancelled,
                ref e if e.is_caused_by_timeout() => FailureReason::UnshortenTimeout,
                _ => FailureReason::UnshortenError,
            };
            failed(reason, input_text)
        }
    }
}

fn unshortened_url(
    input_text: &str,
    input: &'static Input,
    uri: &Uri,
    permission: Option<Permission>,
    redirects: u32,
    ctx: &ConversionContext<'_>,
) -> ConversionState {
    let result = input.parse_uri(uri);
    let position = result.position;
    let Some(html_url) = result.html_url else {
        return if position.is_empty() {
            failed(FailureReason::ParseUrlError, input_text)
        } else {
            ConversionState::ConversionSucceeded {
                input_text: input_text.to_owned(),
                position,
            }
        };
    };
    if position.is_resolved() {
        return ConversionState::ConversionSucceeded {
            input_text: input_text.to_owned(),
            position,
        };
    }
    match permission.unwrap_or_else(|| ctx.preferences.connection_permission()) {
        Permission::Always => ConversionState::GrantedParseHtmlPermission {
            input_text: input_text.to_owned(),
            input,
            html_url,
            position,
            retry: 0,
            redirects,
        },
        Permission::Ask => ConversionState::RequestedParseHtmlPermission {
            input_text: input_text.to_owned(),
            input,
            html_url,
            position,
            redirects,
        },
        Permission::Never => ConversionState::ParseHtmlFailed {
            input_text: input_text.to_owned(),
            position,
        },
    }
}

/// Fills text fields the page didn't provide from what the link carried.
fn merge(scraped: Position, from_link: &Position) -> Position {
    scraped
        .with_q(from_link.q.clone())
        .with_name(from_link.name.clone())
        .with_zoom(from_link.zoom)
}

async fn parse_html(
    input_text: &str,
    input: &'static Input,
    html_url: &str,
    position: &Position,
    retry: u32,
    redirects: u32,
    ctx: &ConversionContext<'_>,
) -> ConversionState {
    if retry > 0 && ctx.retry.wait(retry, &ctx.cancel).await.is_err() {
        return failed(FailureReason::Cancelled, input_text);
    }
    let result = cancellable(&ctx.cancel, ctx.client.fetch_bytes(html_url, retry)).await;

    let bytes = match result {
        Ok(bytes) => bytes,
        Err(err) if err.is_recoverable() && ctx.retry.can_retry(retry) => {
            tracing::warn!(
                input = %input.id,
                retry = retry + 1,
                max_retries = ctx.retry.max_retries,
                error = %err,
                "page fetch timed out, retrying"
            );
            return ConversionState::GrantedParseHtmlPermission {
                input_text: input_text.to_owned(),
                input,
                html_url: html_url.to_owned(),
                position: position.clone(),
                retry: retry + 1,
                redirects,
            };
        }
        Err(err) => {
            let err = err.exhausted();
            tracing::warn!(input = %input.id, error = %err, "page fetch failed");
            let reason = match err {
                NetworkError::Cancelled => FailureReason::Cancelled,
                ref e if e.is_caused_by_timeout() => FailureReason::HtmlTimeout,
                _ => FailureReason::HtmlConnectionError,
            };
            return failed(reason, input_text);
        }
    };

    let scraped = input.parse_html(&bytes);
    if let Some(redirect) = scraped.redirect_url {
        if let Some(next) = follow_redirect(input_text, input, html_url, &redirect, redirects) {
            return next;
        }
    }
    if scraped.position.is_resolved() {
        return ConversionState::ConversionSucceeded {
            input_text: input_text.to_owned(),
            position: merge(scraped.position, position),
        };
    }
    ConversionState::ParseHtmlFailed {
        input_text: input_text.to_owned(),
        position: position.clone(),
    }
}

/// Turns a link found on a page into a freshly received URI. Links that
/// don't resolve, that point back at the page itself, or that come after
/// [`MAX_PAGE_REDIRECTS`] earlier ones are ignored.
fn follow_redirect(
    input_text: &str,
    input: &'static Input,
    html_url: &str,
    redirect: &str,
    redirects: u32,
) -> Option<ConversionState> {
    if redirects >= MAX_PAGE_REDIRECTS {
        tracing::warn!(input = %input.id, redirects, "too many links followed from pages");
        return None;
    }
    let resolved = resolve_against(html_url, redirect).ok()?;
    if resolved == html_url {
        return None;
    }
    let (input, uri) = find_uri(&resolved).or_else(|| Some((input, Uri::parse(&resolved)?)))?;
    tracing::debug!(input = %input.id, uri = %uri, "following link found on page");
    Some(ConversionState::ReceivedUri {
        input_text: input_text.to_owned(),
        input,
        uri,
        permission: Some(Permission::Always),
        redirects: redirects + 1,
    })
}

/// Answers a permission prompt with "yes". With `remember` the answer
/// becomes the stored connection permission.
#[must_use]
pub fn grant(
    state: &ConversionState,
    remember: bool,
    preferences: &dyn Preferences,
) -> Option<ConversionState> {
    let next = match state {
        ConversionState::RequestedUnshortenPermission {
            input_text,
            input,
            uri,
            redirects,
        } => ConversionState::GrantedUnshortenPermission {
            input_text: input_text.clone(),
            input: *input,
            uri: uri.clone(),
            retry: 0,
            redirects: *redirects,
        },
        ConversionState::RequestedParseHtmlPermission {
            input_text,
            input,
            html_url,
            position,
            redirects,
        } => ConversionState::GrantedParseHtmlPermission {
            input_text: input_text.clone(),
            input: *input,
            html_url: html_url.clone(),
            position: position.clone(),
            retry: 0,
            redirects: *redirects,
        },
        _ => return None,
    };
    if remember {
        preferences.set_connection_permission(Permission::Always);
    }
    Some(next)
}

/// Answers a permission prompt with "no". With `remember` the answer
/// becomes the stored connection permission.
#[must_use]
pub fn deny(
    state: &ConversionState,
    remember: bool,
    preferences: &dyn Preferences,
) -> Option<ConversionState> {
    let next = match state {
        ConversionState::RequestedUnshortenPermission { input_text, .. } => {
            ConversionState::DeniedConnectionPermission {
                input_text: input_text.clone(),
            }
        }
        ConversionState::RequestedParseHtmlPermission {
            input_text,
            position,
            ..
        } => ConversionState::ParseHtmlFailed {
            input_text: input_text.clone(),
            position: position.clone(),
        },
        _ => return None,
    };
    if remember {
        preferences.set_connection_permission(Permission::Never);
    }
    Some(next)
}

/// Steps from `state` until a terminal state or a permission prompt.
pub async fn run(mut state: ConversionState, ctx: &ConversionContext<'_>) -> ConversionState {
    while let Some(next) = step(&state, ctx).await {
        tracing::debug!(from = state.name(), to = next.name(), "conversion transition");
        state = next;
    }
    match &state {
        ConversionState::ConversionSucceeded { position, .. } => {
            tracing::info!(
                lat = ?position.lat,
                lon = ?position.lon,
                points = position.points.len(),
                q = ?position.q,
                "conversion succeeded"
            );
        }
        ConversionState::ConversionFailed { reason, .. } => {
            tracing::info!(%reason, "conversion failed");
        }
        _ => {}
    }
    state
}

#[cfg(test)]
#[path = "conversion_test.rs"]
mod tests;
