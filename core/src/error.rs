//! Error types for the ClubCollect API client.
//!
//! # Design
//! Low-level failures (transport, HTTP status, JSON decoding, field casting,
//! pagination bounds, configuration) are described by [`ErrorCause`]. Nothing
//! of that taxonomy crosses the public operations directly: every operation
//! returns [`ApiError`], which carries a human message plus the ordered list
//! of causes that produced it. A resource that fails on several fields at
//! once reports all of them in one `ApiError`.

use std::fmt;

use thiserror::Error;

use crate::cast::CastError;

/// A connection, timeout or I/O failure while talking to the service.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// One underlying reason for an [`ApiError`].
#[derive(Debug, Clone, Error)]
pub enum ErrorCause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body was not JSON, or not the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),

    #[error(transparent)]
    Cast(#[from] CastError),

    /// Page bounds rejected before the pages were requested. `to` is `None`
    /// when the caller left the last page open.
    #[error("invalid page range: from {from} to {}", display_bound(.to))]
    Range { from: u32, to: Option<u32> },

    #[error("configuration error: {0}")]
    Config(String),
}

fn display_bound(bound: &Option<u32>) -> String {
    bound.map_or_else(|| "last page".to_string(), |page| page.to_string())
}

/// The single error type returned by every client operation.
#[derive(Debug, Clone)]
pub struct ApiError {
    message: String,
    causes: Vec<ErrorCause>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, causes: Vec<ErrorCause>) -> Self {
        Self {
            message: message.into(),
            causes,
        }
    }

    /// Wrap a single cause, reusing its text as the message.
    pub fn from_cause(cause: impl Into<ErrorCause>) -> Self {
        let cause = cause.into();
        Self {
            message: cause.to_string(),
            causes: vec![cause],
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::from_cause(ErrorCause::Config(message.into()))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::from_cause(ErrorCause::Decode(message.into()))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn causes(&self) -> &[ErrorCause] {
        &self.causes
    }

    /// Status code of the first `HttpStatus` cause, if any.
    pub fn status(&self) -> Option<u16> {
        self.causes.iter().find_map(|cause| match cause {
            ErrorCause::HttpStatus { status, .. } => Some(*status),
            _ => None,
        })
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Iterate over the cast failures carried by this error.
    pub fn cast_errors(&self) -> impl Iterator<Item = &CastError> {
        self.causes.iter().filter_map(|cause| match cause {
            ErrorCause::Cast(err) => Some(err),
            _ => None,
        })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::from_cause(err)
    }
}

impl From<CastError> for ApiError {
    fn from(err: CastError) -> Self {
        Self::from_cause(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let [only] = self.causes.as_slice() {
            if only.to_string() == self.message {
                return Ok(());
            }
        }
        for cause in &self.causes {
            write!(f, "; {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
