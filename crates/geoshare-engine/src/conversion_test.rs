use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use geoshare_core::{Automation, Point};
use geoshare_inputs::InputId;

use super::*;
use crate::preferences::MemoryPreferences;

/// Replays scripted responses in order and counts calls.
#[derive(Default)]
struct FakeClient {
    redirects: Mutex<VecDeque<Result<String, NetworkError>>>,
    pages: Mutex<VecDeque<Result<Vec<u8>, NetworkError>>>,
    redirect_calls: AtomicU32,
    page_calls: AtomicU32,
    fetched: Mutex<Vec<String>>,
}

impl FakeClient {
    fn with_redirects(redirects: Vec<Result<String, NetworkError>>) -> Self {
        Self {
            redirects: Mutex::new(redirects.into()),
            ..Self::default()
        }
    }

    fn with_pages(pages: Vec<Result<&str, NetworkError>>) -> Self {
        Self {
            pages: Mutex::new(
                pages
                    .into_iter()
                    .map(|page| page.map(|html| html.as_bytes().to_vec()))
                    .collect(),
            ),
            ..Self::default()
        }
    }
}

#[async_trait]
impl NetworkClient for FakeClient {
    async fn resolve_redirect(
        &self,
        _url: &str,
        _method: ShortUriMethod,
        _retry: u32,
    ) -> Result<String, NetworkError> {
        self.redirect_calls.fetch_add(1, Ordering::SeqCst);
        self.redirects
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected redirect request")
    }

    async fn fetch_bytes(&self, url: &str, _retry: u32) -> Result<Vec<u8>, NetworkError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(url.to_owned());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected page request")
    }
}

fn timeout() -> NetworkError {
    NetworkError::Timeout {
        url: "https://example.com".to_owned(),
    }
}

fn context<'a>(client: &'a FakeClient, preferences: &'a MemoryPreferences) -> ConversionContext<'a> {
    ConversionContext {
        client,
        preferences,
        retry: RetryPolicy::new(2, 0),
        cancel: CancellationToken::new(),
    }
}

fn prefs(permission: Permission) -> MemoryPreferences {
    MemoryPreferences::new(permission, Automation::Noop)
}

async fn convert(text: &str, client: &FakeClient, preferences: &MemoryPreferences) -> ConversionState {
    run(ConversionState::received(text, None), &context(client, preferences)).await
}

fn succeeded(state: &ConversionState) -> &Position {
    match state {
        ConversionState::ConversionSucceeded { position, .. } => position,
        other => panic!("expected success, got {other:?}"),
    }
}

fn failure(state: &ConversionState) -> FailureReason {
    match state {
        ConversionState::ConversionFailed { reason, .. } => *reason,
        other => panic!("expected failure, got {other:?}"),
    }
}

const SHORT_LINK: &str = "https://maps.app.goo.gl/TmbeHMiLEfTBws9EA";
const RESOLVED: &str = "https://www.google.com/maps/@52.5163,13.3777,15z";

// ---------------------------------------------------------------------------
// Links that need no network
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_text_is_a_missing_url() {
    let client = FakeClient::default();
    let state = convert("   ", &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::MissingUrl);
}

#[tokio::test]
async fn unknown_link_is_unsupported() {
    let client = FakeClient::default();
    let state = convert("https://example.com/map", &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::UnsupportedService);
}

#[tokio::test]
async fn full_link_converts_offline() {
    let client = FakeClient::default();
    let state = convert(
        "Look: https://maps.google.com/?q=48.8584,2.2945&z=15",
        &client,
        &prefs(Permission::Never),
    )
    .await;
    let position = succeeded(&state);
    assert_eq!((position.lat, position.lon), (Some(48.8584), Some(2.2945)));
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.page_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn query_only_link_succeeds_without_fallback() {
    let client = FakeClient::default();
    let state = convert(
        "https://map.baidu.com/search/%E6%95%85%E5%AE%AB/",
        &client,
        &prefs(Permission::Never),
    )
    .await;
    assert_eq!(succeeded(&state).q.as_deref(), Some("故宫"));
}

#[tokio::test]
async fn link_without_anything_usable_fails_to_parse() {
    let client = FakeClient::default();
    let state = convert(
        "https://www.openstreetmap.org/about",
        &client,
        &prefs(Permission::Always),
    )
    .await;
    assert_eq!(failure(&state), FailureReason::ParseUrlError);
}

#[tokio::test]
async fn initial_state_is_inert() {
    let client = FakeClient::default();
    let preferences = prefs(Permission::Always);
    assert!(step(&ConversionState::Initial, &context(&client, &preferences))
        .await
        .is_none());
}

// ---------------------------------------------------------------------------
// Short links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_link_is_resolved_when_always_permitted() {
    let client = FakeClient::with_redirects(vec![Ok(RESOLVED.to_owned())]);
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Always)).await;
    let position = succeeded(&state);
    assert_eq!((position.lat, position.lon), (Some(52.5163), Some(13.3777)));
    assert_eq!(position.zoom, Some(15.0));
}

#[tokio::test]
async fn resolved_short_link_continues_with_permission_granted() {
    let client = FakeClient::with_redirects(vec![Ok(RESOLVED.to_owned())]);
    let preferences = prefs(Permission::Always);
    let ctx = context(&client, &preferences);

    let received = step(&ConversionState::received(SHORT_LINK, None), &ctx)
        .await
        .unwrap();
    let granted = step(&received, &ctx).await.unwrap();
    assert!(matches!(
        granted,
        ConversionState::GrantedUnshortenPermission { retry: 0, .. }
    ));

    let next = step(&granted, &ctx).await.unwrap();
    let ConversionState::UnshortenedUrl {
        ref uri,
        permission,
        ..
    } = next
    else {
        panic!("expected an unshortened url, got {next:?}");
    };
    assert_eq!(uri.as_str(), RESOLVED);
    assert_eq!(permission, Some(Permission::Always));
}

#[tokio::test]
async fn ask_stops_at_the_prompt_and_grant_continues() {
    let client = FakeClient::with_redirects(vec![Ok(RESOLVED.to_owned())]);
    let preferences = prefs(Permission::Ask);
    let ctx = context(&client, &preferences);

    let state = run(ConversionState::received(SHORT_LINK, None), &ctx).await;
    assert!(state.is_awaiting_permission());
    assert_eq!(state.input().map(|input| input.id), Some(InputId::GoogleMaps));
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 0);

    let granted = grant(&state, true, &preferences).unwrap();
    assert_eq!(preferences.connection_permission(), Permission::Always);
    let state = run(granted, &ctx).await;
    assert!(succeeded(&state).is_resolved());
}

#[tokio::test]
async fn grant_without_remember_keeps_the_preference() {
    let preferences = prefs(Permission::Ask);
    let state = ConversionState::RequestedUnshortenPermission {
        input_text: SHORT_LINK.to_owned(),
        input: geoshare_inputs::input(InputId::GoogleMaps),
        uri: Uri::parse(SHORT_LINK).unwrap(),
        redirects: 0,
    };
    let next = grant(&state, false, &preferences).unwrap();
    assert!(matches!(
        next,
        ConversionState::GrantedUnshortenPermission { retry: 0, .. }
    ));
    assert_eq!(preferences.connection_permission(), Permission::Ask);
}

#[tokio::test]
async fn deny_fails_and_can_be_remembered() {
    let client = FakeClient::default();
    let preferences = prefs(Permission::Ask);
    let ctx = context(&client, &preferences);

    let state = run(ConversionState::received(SHORT_LINK, None), &ctx).await;
    let denied = deny(&state, true, &preferences).unwrap();
    assert!(matches!(
        denied,
        ConversionState::DeniedConnectionPermission { .. }
    ));
    assert_eq!(preferences.connection_permission(), Permission::Never);
    let state = run(denied, &ctx).await;
    assert_eq!(failure(&state), FailureReason::ConnectionPermissionDenied);
}

#[tokio::test]
async fn grant_and_deny_ignore_other_states() {
    let preferences = prefs(Permission::Ask);
    let state = ConversionState::received("x", None);
    assert!(grant(&state, true, &preferences).is_none());
    assert!(deny(&state, true, &preferences).is_none());
    assert_eq!(preferences.connection_permission(), Permission::Ask);
}

#[tokio::test]
async fn never_permission_denies_without_asking() {
    let client = FakeClient::default();
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Never)).await;
    assert_eq!(failure(&state), FailureReason::ConnectionPermissionDenied);
}

#[tokio::test]
async fn explicit_permission_overrides_the_preference() {
    let client = FakeClient::with_redirects(vec![Ok(RESOLVED.to_owned())]);
    let preferences = prefs(Permission::Never);
    let state = run(
        ConversionState::received(SHORT_LINK, Some(Permission::Always)),
        &context(&client, &preferences),
    )
    .await;
    assert!(succeeded(&state).is_resolved());
}

#[tokio::test]
async fn timeout_is_retried_with_a_growing_counter() {
    let client = FakeClient::with_redirects(vec![Err(timeout()), Ok(RESOLVED.to_owned())]);
    let preferences = prefs(Permission::Always);
    let ctx = context(&client, &preferences);

    let mut state = ConversionState::received(SHORT_LINK, None);
    let mut retries = Vec::new();
    while let Some(next) = step(&state, &ctx).await {
        if let ConversionState::GrantedUnshortenPermission { retry, .. } = next {
            retries.push(retry);
        }
        state = next;
    }
    assert_eq!(retries, vec![0, 1]);
    assert!(succeeded(&state).is_resolved());
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn timeouts_past_the_cap_report_a_timeout() {
    let client = FakeClient::with_redirects(vec![Err(timeout()), Err(timeout()), Err(timeout())]);
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::UnshortenTimeout);
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unrecoverable_error_is_not_retried() {
    let client = FakeClient::with_redirects(vec![Err(NetworkError::unrecoverable(
        SHORT_LINK,
        "not found",
        Some(404),
    ))]);
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::UnshortenError);
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unrecoverable_error_caused_by_timeout_reports_a_timeout() {
    let client = FakeClient::with_redirects(vec![Err(timeout().exhausted())]);
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::UnshortenTimeout);
}

#[tokio::test]
async fn cancelled_conversion_fails_as_cancelled() {
    let client = FakeClient::with_redirects(vec![Ok(RESOLVED.to_owned())]);
    let preferences = prefs(Permission::Always);
    let ctx = context(&client, &preferences);
    ctx.cancel.cancel();
    let state = run(ConversionState::received(SHORT_LINK, None), &ctx).await;
    assert_eq!(failure(&state), FailureReason::Cancelled);
    assert_eq!(client.redirect_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn client_cancellation_fails_as_cancelled() {
    let client = FakeClient::with_redirects(vec![Err(NetworkError::Cancelled)]);
    let state = convert(SHORT_LINK, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::Cancelled);
}

// ---------------------------------------------------------------------------
// HTML fallback
// ---------------------------------------------------------------------------

const APPLE_PLACE: &str = "https://maps.apple.com/place?auid=1234567890123456789";
const APPLE_PAGE: &str = r#"<head>
<meta property="place:location:latitude" content="50.894967">
<meta property="place:location:longitude" content="4.341626">
</head>"#;

#[tokio::test]
async fn html_fallback_finds_coordinates() {
    let client = FakeClient::with_pages(vec![Ok(APPLE_PAGE)]);
    let state = convert(APPLE_PLACE, &client, &prefs(Permission::Always)).await;
    assert_eq!(
        *succeeded(&state),
        Position::from_coords(50.894_967, 4.341_626)
    );
    assert_eq!(*client.fetched.lock().unwrap(), vec![APPLE_PLACE.to_owned()]);
}

#[tokio::test]
async fn html_fallback_asks_first() {
    let client = FakeClient::with_pages(vec![Ok(APPLE_PAGE)]);
    let preferences = prefs(Permission::Ask);
    let ctx = context(&client, &preferences);
    let state = run(ConversionState::received(APPLE_PLACE, None), &ctx).await;
    assert!(matches!(
        state,
        ConversionState::RequestedParseHtmlPermission { .. }
    ));
    let state = run(grant(&state, false, &preferences).unwrap(), &ctx).await;
    assert!(succeeded(&state).is_resolved());
}

#[tokio::test]
async fn denied_html_fallback_without_query_fails() {
    let client = FakeClient::default();
    let state = convert(APPLE_PLACE, &client, &prefs(Permission::Never)).await;
    assert_eq!(failure(&state), FailureReason::ParseHtmlError);
}

#[tokio::test]
async fn denied_html_fallback_keeps_the_query() {
    let client = FakeClient::default();
    let state = convert(
        "https://www.google.com/maps/place/Eiffel+Tower",
        &client,
        &prefs(Permission::Never),
    )
    .await;
    let position = succeeded(&state);
    assert_eq!(position.q.as_deref(), Some("Eiffel Tower"));
    assert!(!position.is_resolved());
}

#[tokio::test]
async fn page_without_coordinates_keeps_the_query() {
    let client = FakeClient::with_pages(vec![Ok("<html>nothing here</html>")]);
    let state = convert(
        "https://www.google.com/maps/place/Eiffel+Tower",
        &client,
        &prefs(Permission::Always),
    )
    .await;
    assert_eq!(succeeded(&state).q.as_deref(), Some("Eiffel Tower"));
}

#[tokio::test]
async fn scraped_coordinates_keep_the_query_text() {
    let client = FakeClient::with_pages(vec![Ok("[null,null,48.8584,2.2945]")]);
    let state = convert(
        "https://www.google.com/maps/place/Eiffel+Tower",
        &client,
        &prefs(Permission::Always),
    )
    .await;
    let position = succeeded(&state);
    assert_eq!((position.lat, position.lon), (Some(48.8584), Some(2.2945)));
    assert_eq!(position.q.as_deref(), Some("Eiffel Tower"));
}

#[tokio::test]
async fn relative_link_on_page_is_followed() {
    let page = r#"<a href="/maps/place/Tour+Eiffel/data=!3d48.8584!4d2.2945">Tour Eiffel</a>"#;
    let client = FakeClient::with_pages(vec![Ok(page)]);
    let state = convert(
        "https://www.google.com/maps/place/Eiffel+Tower",
        &client,
        &prefs(Permission::Ask),
    )
    .await;
    assert!(state.is_awaiting_permission());

    let preferences = prefs(Permission::Ask);
    let ctx = context(&client, &preferences);
    let state = run(grant(&state, false, &preferences).unwrap(), &ctx).await;
    let position = succeeded(&state);
    assert_eq!((position.lat, position.lon), (Some(48.8584), Some(2.2945)));
    assert_eq!(client.page_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pages_linking_to_each_other_stop_after_the_redirect_cap() {
    let to_b = r#"<a href="/maps/place/B">B</a>"#;
    let to_a = r#"<a href="/maps/place/A">A</a>"#;
    let client = FakeClient::with_pages(vec![Ok(to_b), Ok(to_a), Ok(to_b), Ok(to_a), Ok(to_b), Ok(to_a)]);
    let state = convert(
        "https://www.google.com/maps/place/A",
        &client,
        &prefs(Permission::Always),
    )
    .await;

    assert_eq!(succeeded(&state).q.as_deref(), Some("B"));
    assert_eq!(client.page_calls.load(Ordering::SeqCst), MAX_PAGE_REDIRECTS + 1);
    let fetched = client.fetched.lock().unwrap();
    assert!(fetched[0].ends_with("/maps/place/A"));
    assert!(fetched[1].ends_with("/maps/place/B"));
    assert!(fetched[2].ends_with("/maps/place/A"));
}

#[tokio::test]
async fn page_timeouts_past_the_cap_report_a_timeout() {
    let client = FakeClient::with_pages(vec![Err(timeout()), Err(timeout()), Err(timeout())]);
    let state = convert(APPLE_PLACE, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::HtmlTimeout);
    assert_eq!(client.page_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn page_timeout_then_success() {
    let client = FakeClient::with_pages(vec![Err(timeout()), Ok(APPLE_PAGE)]);
    let state = convert(APPLE_PLACE, &client, &prefs(Permission::Always)).await;
    assert!(succeeded(&state).is_resolved());
}

#[tokio::test]
async fn page_error_is_a_connection_error() {
    let client = FakeClient::with_pages(vec![Err(NetworkError::unrecoverable(
        APPLE_PLACE,
        "server error",
        Some(500),
    ))]);
    let state = convert(APPLE_PLACE, &client, &prefs(Permission::Always)).await;
    assert_eq!(failure(&state), FailureReason::HtmlConnectionError);
}

#[tokio::test]
async fn short_link_then_html_fallback_needs_no_second_prompt() {
    let client = FakeClient {
        redirects: Mutex::new(VecDeque::from([Ok(APPLE_PLACE.to_owned())])),
        pages: Mutex::new(VecDeque::from([Ok(APPLE_PAGE.as_bytes().to_vec())])),
        ..FakeClient::default()
    };
    let preferences = prefs(Permission::Ask);
    let ctx = context(&client, &preferences);
    let state = run(
        ConversionState::received("https://maps.apple/p/QJcE3l5Aw1yRSc", None),
        &ctx,
    )
    .await;
    let state = run(grant(&state, false, &preferences).unwrap(), &ctx).await;
    assert_eq!(succeeded(&state).main_point(), Some(Point::new(50.894_967, 4.341_626)));
}

#[test]
fn failure_reasons_have_messages() {
    assert_eq!(
        FailureReason::UnshortenTimeout.to_string(),
        "Resolving the short link timed out"
    );
    assert_eq!(
        FailureReason::ConnectionPermissionDenied.to_string(),
        "Connecting to the map service is not permitted"
    );
}
