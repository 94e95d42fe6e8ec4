//! Shared HTTP client plumbing.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::error::{truncate_body, AppError, Result};

/// Builds the client used by every adapter.
///
/// # Errors
///
/// Returns `AppError::Http` if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("logalert/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Reads the body of `response`, returning it with the status.
///
/// # Errors
///
/// Returns `AppError::Http` if the body cannot be read.
pub async fn read_body(response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

/// Turns a non-2xx status into `AppError::Status`.
///
/// # Errors
///
/// Returns `AppError::Status` if `status` is not a success code.
pub fn ensure_success(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(AppError::Status {
        status: status.as_u16(),
        body: truncate_body(body),
    })
}
