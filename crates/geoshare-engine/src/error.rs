use thiserror::Error;

/// Errors returned by a [`NetworkClient`](crate::network::NetworkClient).
///
/// Only [`NetworkError::Timeout`] is retried. Once retries are exhausted the
/// timeout is wrapped into [`NetworkError::Unrecoverable`] with the timeout
/// as its cause, so callers can still tell a slow service from a broken one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Unrecoverable {
        url: String,
        message: String,
        status: Option<u16>,
        #[source]
        cause: Option<Box<NetworkError>>,
    },

    #[error("request cancelled")]
    Cancelled,
}

impl NetworkError {
    pub(crate) fn unrecoverable(url: &str, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Unrecoverable {
            url: url.to_owned(),
            message: message.into(),
            status,
            cause: None,
        }
    }

    /// Wraps an error that may no longer be retried.
    #[must_use]
    pub fn exhausted(self) -> Self {
        let Self::Timeout { url } = &self else {
            return self;
        };
        Self::Unrecoverable {
            url: url.clone(),
            message: "gave up after repeated timeouts".to_owned(),
            status: None,
            cause: Some(Box::new(self)),
        }
    }

    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// `true` for a timeout, or an unrecoverable error whose cause chain
    /// ends in one.
    #[must_use]
    pub fn is_caused_by_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Unrecoverable {
                cause: Some(cause), ..
            } => cause.is_caused_by_timeout(),
            Self::Unrecoverable { cause: None, .. } | Self::Cancelled => false,
        }
    }
}
