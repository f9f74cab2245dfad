//! Network access for short-link resolution and HTML fallback.
//!
//! The state machine only sees [`NetworkClient`]; [`HttpClient`] is the
//! reqwest implementation used by the binary and the integration tests.

use std::time::Duration;

use async_trait::async_trait;
use geoshare_core::AppConfig;
use geoshare_inputs::ShortUriMethod;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client, Response, Url};

use crate::error::NetworkError;

/// Fetched pages are truncated at this size; coordinates sit in the head or
/// in early inline scripts.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Returns the absolute URL `url` redirects to. `retry` counts earlier
    /// failed attempts and is informational.
    async fn resolve_redirect(
        &self,
        url: &str,
        method: ShortUriMethod,
        retry: u32,
    ) -> Result<String, NetworkError>;

    /// Fetches the body of `url`, following redirects.
    async fn fetch_bytes(&self, url: &str, retry: u32) -> Result<Vec<u8>, NetworkError>;
}

/// reqwest-backed [`NetworkClient`].
///
/// `HEAD` short links are resolved with a client that never follows
/// redirects so the first `Location` header can be read; `GET` short links
/// and page fetches use a client that follows them.
#[derive(Debug, Clone)]
pub struct HttpClient {
    no_redirect: Client,
    follow: Client,
}

impl HttpClient {
    /// Creates a client from the configured timeouts and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if a `reqwest::Client` cannot be built
    /// (e.g. TLS backend initialisation fails).
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::with_timeouts(
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
            &config.user_agent,
        )
    }

    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if a `reqwest::Client` cannot be built.
    pub fn with_timeouts(
        timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let builder = || {
            Client::builder()
                .timeout(timeout)
                .connect_timeout(connect_timeout)
                .user_agent(user_agent)
        };
        Ok(Self {
            no_redirect: builder().redirect(redirect::Policy::none()).build()?,
            follow: builder().redirect(redirect::Policy::limited(10)).build()?,
        })
    }

    async fn read_location(&self, url: &str) -> Result<String, NetworkError> {
        let response = self
            .no_redirect
            .head(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))?;
        let status = response.status();
        if !status.is_redirection() {
            return Err(NetworkError::unrecoverable(
                url,
                format!("expected a redirect, got HTTP {status}"),
                Some(status.as_u16()),
            ));
        }
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                NetworkError::unrecoverable(url, "redirect without a Location header", Some(status.as_u16()))
            })?;
        resolve_against(url, location)
    }

    async fn get(&self, url: &str) -> Result<Response, NetworkError> {
        let response = self
            .follow
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::unrecoverable(
                url,
                format!("unexpected HTTP {status}"),
                Some(status.as_u16()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl NetworkClient for HttpClient {
    async fn resolve_redirect(
        &self,
        url: &str,
        method: ShortUriMethod,
        retry: u32,
    ) -> Result<String, NetworkError> {
        tracing::debug!(url, ?method, retry, "resolving short link");
        match method {
            ShortUriMethod::Head => self.read_location(url).await,
            ShortUriMethod::Get => {
                let response = self.get(url).await?;
                Ok(response.url().to_string())
            }
        }
    }

    async fn fetch_bytes(&self, url: &str, retry: u32) -> Result<Vec<u8>, NetworkError> {
        tracing::debug!(url, retry, "fetching page");
        let mut response = self.get(url).await?;
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify(url, &e))? {
            let room = MAX_BODY_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                tracing::warn!(url, limit = MAX_BODY_BYTES, "page truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn classify(url: &str, err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            url: url.to_owned(),
        }
    } else {
        NetworkError::unrecoverable(url, err.to_string(), err.status().map(|s| s.as_u16()))
    }
}

/// Resolves a possibly relative `location` against `base`.
pub(crate) fn resolve_against(base: &str, location: &str) -> Result<String, NetworkError> {
    let base_url =
        Url::parse(base).map_err(|e| NetworkError::unrecoverable(base, e.to_string(), None))?;
    base_url
        .join(location.trim())
        .map(String::from)
        .map_err(|e| NetworkError::unrecoverable(base, e.to_string(), None))
}
