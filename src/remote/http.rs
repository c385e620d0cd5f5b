//! Shared HTTP plumbing for the site and weather clients.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{RemoteError, RequestPolicy};

pub(crate) const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Build the client used by every remote collaborator.
///
/// The client-level timeout matches the policy's per-attempt timeout so a
/// stalled connection can never outlive one attempt.
pub(crate) fn create_http_client(policy: &RequestPolicy) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS).min(policy.timeout()))
        .timeout(policy.timeout())
        .user_agent(concat!("curewatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Issue a GET and return the body of a successful response.
pub(crate) async fn get_body(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<Vec<u8>, RemoteError> {
    let response = client.get(url).query(query).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::Http {
            endpoint: endpoint_name(url),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    serde_json::from_slice(body).map_err(|err| RemoteError::Malformed(err.to_string()))
}

/// Last path segment, which is enough to tell the endpoints apart in logs.
fn endpoint_name(url: &str) -> String {
    url.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(url)
        .to_string()
}
