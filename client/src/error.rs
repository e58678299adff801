//! [`Error`] definitions.

use derive_more::{Display, From};
use serde::Deserialize;

/// Error of an [`Api`] call.
///
/// [`Api`]: crate::Api
#[derive(Debug, Display, derive_more::Error)]
pub enum Error {
    /// Token of the [`Session`] has expired, so it was cleared and nothing
    /// was sent.
    ///
    /// [`Session`]: crate::Session
    #[display("Session expired. Please log in again.")]
    SessionExpired,

    /// Input was rejected before sending anything.
    #[display("{_0}")]
    Validation(#[error(not(source))] &'static str),

    /// Call has failed.
    #[display("{message}")]
    Failed {
        /// Short human-readable description of the failed call.
        message: &'static str,

        /// [`Cause`] of the failure.
        source: Cause,
    },
}

impl Error {
    /// Creates a new [`Error::Failed`] with the provided `message`.
    pub(crate) fn failed(
        message: &'static str,
        cause: impl Into<Cause>,
    ) -> Self {
        Self::Failed {
            message,
            source: cause.into(),
        }
    }

    /// Returns the [`ServerError`] this [`Error`] was caused by, if any.
    #[must_use]
    pub fn server(&self) -> Option<&ServerError> {
        match self {
            Self::Failed {
                source: Cause::Server(e),
                ..
            } => Some(e),
            Self::Failed { .. }
            | Self::SessionExpired
            | Self::Validation(_) => None,
        }
    }
}

/// Underlying cause of an [`Error::Failed`].
#[derive(Debug, Display, derive_more::Error, From)]
pub enum Cause {
    /// Request could not be performed, or its response could not be read.
    #[display("Request failed: {_0}")]
    Request(reqwest::Error),

    /// Server has responded with an error.
    #[display("{_0}")]
    Server(ServerError),

    /// Token could not be persisted.
    #[display("Token storage failed: {_0}")]
    Storage(std::io::Error),
}

/// Error reported by the server in its error envelope.
#[derive(Clone, Debug, Deserialize, Display, derive_more::Error, Eq, PartialEq)]
#[display("{message}")]
pub struct ServerError {
    /// Human-readable message.
    pub message: String,

    /// HTTP status code of the response.
    pub status: u16,

    /// Machine-readable code, if the server has provided one.
    #[serde(default)]
    pub code: String,
}

/// Envelope the server wraps its errors into.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    /// Wrapped [`ServerError`].
    pub(crate) error: ServerError,
}
