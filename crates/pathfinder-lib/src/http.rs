//! Shared blocking HTTP plumbing for the geocoding and directions providers.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Blocking client type shared by every provider.
pub type HttpClient = Client;

/// Longest slice of a failing response body kept for diagnostics.
const MAX_BODY_SNIPPET: usize = 200;

/// Build the blocking client shared by all providers.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("pathfinder-lib/{version}", version = env!("CARGO_PKG_VERSION"))
}

/// Why a single provider attempt did not produce a usable body.
#[derive(Debug)]
pub(crate) enum AttemptFailure {
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
    Malformed(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status { status, body } if body.is_empty() => {
                write!(f, "HTTP {status}")
            }
            AttemptFailure::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            AttemptFailure::Transport(err) => write!(f, "transport error: {err}"),
            AttemptFailure::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}

/// Issue one GET and return the body of a successful response.
pub(crate) fn get_text(
    client: &Client,
    url: Url,
    query: &[(&str, String)],
) -> std::result::Result<String, AttemptFailure> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(AttemptFailure::Transport)?;
    let status = response.status();
    let body = response.text().map_err(AttemptFailure::Transport)?;
    if !status.is_success() {
        return Err(AttemptFailure::Status {
            status,
            body: snippet(&body),
        });
    }
    Ok(body)
}

/// Run `attempt` up to `attempts` times (at least once), sequentially.
///
/// Returns the first success, or the last failure once the budget is spent.
pub(crate) fn with_attempts<T, F>(
    provider: &str,
    attempts: u32,
    mut attempt: F,
) -> std::result::Result<T, AttemptFailure>
where
    F: FnMut() -> std::result::Result<T, AttemptFailure>,
{
    let attempts = attempts.max(1);
    let mut number = 1;
    loop {
        match attempt() {
            Ok(value) => {
                debug!(provider, attempt = number, "provider call succeeded");
                return Ok(value);
            }
            Err(failure) if number < attempts => {
                warn!(provider, attempt = number, attempts, error = %failure, "provider call failed; retrying");
                number += 1;
            }
            Err(failure) => {
                warn!(provider, attempt = number, attempts, error = %failure, "provider attempts exhausted");
                return Err(failure);
            }
        }
    }
}

/// Parse `raw` into a URL, treating failures as configuration errors.
pub(crate) fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|err| Error::InvalidConfig {
        key: key.to_string(),
        message: format!("'{raw}' is not a valid URL: {err}"),
    })
}

/// Append one path segment to `base`, percent-encoding it.
pub(crate) fn with_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_SNIPPET) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
