//! Boundary to the remote text-transformation backend.
//!
//! Transport (HTTP, concurrency cap, retries) lives behind [`ConverterService`];
//! this module only adds the per-call time ceiling.

use std::{error::Error, fmt, time::Duration};

use async_trait::async_trait;

/// Which backend operation a shortcut invokes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Convert,
    Translate,
    Rephrase,
}

impl TransformKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransformKind::Convert => "convert",
            TransformKind::Translate => "translate",
            TransformKind::Rephrase => "rephrase",
        }
    }

    /// Response field carrying the result for this operation.
    pub const fn response_field(self) -> &'static str {
        match self {
            TransformKind::Convert => "convertedText",
            TransformKind::Translate => "translatedText",
            TransformKind::Rephrase => "rephrasedText",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceError {
    RateLimited,
    Timeout,
    ApiError(String),
    TransportFailure(String),
}

impl ServiceError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceError::RateLimited => "rate_limited",
            ServiceError::Timeout => "timeout",
            ServiceError::ApiError(_) => "api_error",
            ServiceError::TransportFailure(_) => "transport_failure",
        }
    }

    /// Message shown to the user; every variant is a transient service failure.
    pub fn user_text(&self) -> &'static str {
        match self {
            ServiceError::RateLimited => "Too many requests, please try again later",
            ServiceError::Timeout
            | ServiceError::ApiError(_)
            | ServiceError::TransportFailure(_) => "Failed to connect to the API",
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::RateLimited => f.write_str("rate limit exceeded"),
            ServiceError::Timeout => f.write_str("request timed out"),
            ServiceError::ApiError(msg) => write!(f, "API error: {msg}"),
            ServiceError::TransportFailure(msg) => write!(f, "transport failure: {msg}"),
        }
    }
}

impl Error for ServiceError {}

/// Remote text transformations. Implementations run on the UI thread's
/// local executor, so futures need not be `Send`.
#[async_trait(?Send)]
pub trait ConverterService {
    async fn convert(&self, text: &str) -> Result<String, ServiceError>;
    async fn translate(&self, text: &str) -> Result<String, ServiceError>;
    async fn rephrase(&self, text: &str) -> Result<String, ServiceError>;
}

/// Invokes `kind` on `service`, failing with [`ServiceError::Timeout`] past `ceiling`.
pub async fn call_with_timeout<S>(
    service: &S,
    kind: TransformKind,
    text: &str,
    ceiling: Duration,
) -> Result<String, ServiceError>
where
    S: ConverterService + ?Sized,
{
    let call = async {
        match kind {
            TransformKind::Convert => service.convert(text).await,
            TransformKind::Translate => service.translate(text).await,
            TransformKind::Rephrase => service.rephrase(text).await,
        }
    };

    match tokio::time::timeout(ceiling, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::trace!(kind = kind.as_str(), ?ceiling, "service call hit the time ceiling");
            Err(ServiceError::Timeout)
        }
    }
}
