//! HTTP access to the GitLab REST API.
//!
//! Commands talk to GitLab only through the [`Transport`] trait so that they can
//! be exercised against a fake in tests. [`GitLabClient`] is the production
//! implementation on top of `reqwest::blocking`.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

/// Header carrying the personal access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{method} {url} returned HTTP {status}: {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("GitLab access is not configured: {0}")]
    Unconfigured(String),
}

/// A successful response with its body already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// Header names are lower-case.
    pub headers: HashMap<String, String>,
    /// `Value::Null` when the server sent no body.
    pub body: Value,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

pub trait Transport {
    fn get(&self, url: &str) -> Result<Response, TransportError>;

    fn put(&self, url: &str) -> Result<Response, TransportError>;

    fn post(&self, url: &str, form: &[(&str, &str)]) -> Result<Response, TransportError>;
}

/// Production transport authenticating with a personal access token.
pub struct GitLabClient {
    client: reqwest::blocking::Client,
    token: String,
}

impl GitLabClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        Self::with_token(&config.access_token, config.timeout_secs)
    }

    /// Without `timeout_secs` requests may block indefinitely.
    pub fn with_token(token: &str, timeout_secs: Option<u64>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout_secs.map(Duration::from_secs))
            .build()?;
        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    fn send(
        &self,
        method: &'static str,
        url: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<Response, TransportError> {
        tracing::debug!("{method} {url}");

        let response = request.header(TOKEN_HEADER, &self.token).send()?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let text = response.text()?;

        if !status.is_success() {
            return Err(TransportError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|source| TransportError::Decode {
                url: url.to_string(),
                source,
            })?
        };

        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl Transport for GitLabClient {
    fn get(&self, url: &str) -> Result<Response, TransportError> {
        self.send("GET", url, self.client.get(url))
    }

    fn put(&self, url: &str) -> Result<Response, TransportError> {
        self.send("PUT", url, self.client.put(url))
    }

    fn post(&self, url: &str, form: &[(&str, &str)]) -> Result<Response, TransportError> {
        self.send("POST", url, self.client.post(url).form(form))
    }
}

/// Stand-in used when configuration could not be loaded, so that help output
/// still works. Every request fails with the original reason.
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail(&self) -> Result<Response, TransportError> {
        Err(TransportError::Unconfigured(self.reason.clone()))
    }
}

impl Transport for Unconfigured {
    fn get(&self, _url: &str) -> Result<Response, TransportError> {
        self.fail()
    }

    fn put(&self, _url: &str) -> Result<Response, TransportError> {
        self.fail()
    }

    fn post(&self, _url: &str, _form: &[(&str, &str)]) -> Result<Response, TransportError> {
        self.fail()
    }
}

/// GitLab reports errors as `{"message": ...}` or `{"error": ...}`, where the
/// message may itself be an object of field errors.
fn error_message(text: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return text.trim().to_string();
    };
    match value.get("message").or_else(|| value.get("error")) {
        Some(Value::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => text.trim().to_string(),
    }
}
