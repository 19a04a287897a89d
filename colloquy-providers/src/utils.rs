//! Common utilities for provider implementations

use crate::error::{timeout_error, HttpError};
use colloquy_core::Error;
use std::future::Future;
use std::time::Duration;

/// Await a transport call, enforcing an optional deadline
///
/// Transport failures and an elapsed deadline both come back as inference
/// failures for `provider`. Dropping the inner future on timeout cancels the
/// request.
pub async fn with_deadline<T, F>(provider: &str, timeout: Option<Duration>, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, HttpError>>,
{
    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| timeout_error(provider, limit))?,
        None => call.await,
    };
    outcome.map_err(|e| e.into_inference(provider))
}
