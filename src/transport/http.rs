use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};

use super::{RemoteClient, RemoteRequest, RemoteResponse, RequestTarget, TransportError};
use crate::config::SyncConfig;

/// Blocking HTTP client for the remote registry.
///
/// Endpoints are joined onto the base URL, so a base URL meant to be a
/// directory should end with `/`.
pub struct HttpRemoteClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpRemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidRequest(format!("base url {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| TransportError::Unconfigured("base_url is not set".into()))?;
        Self::new(base_url, config.timeout())
    }

    fn url(&self, request: &RemoteRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(&request.endpoint)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.endpoint, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn send(&self, method: Method, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let url = self.url(request)?;
        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            if let Some(content_type) = request.content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| self.map_error(e))?;
        Ok(RemoteResponse { status, body })
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(timeout_millis(self.timeout))
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

impl RemoteClient for HttpRemoteClient {
    fn get(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.send(Method::GET, request)
    }

    fn post(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.send(Method::POST, request)
    }

    fn put(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.send(Method::PUT, request)
    }

    fn patch(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.send(Method::PATCH, request)
    }

    fn delete(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self.send(Method::DELETE, request)
    }

    fn describe(&self, request: &RemoteRequest) -> RequestTarget {
        match self.url(request) {
            Ok(url) => RequestTarget {
                host: url.host_str().unwrap_or_default().to_string(),
                uri: url.to_string(),
            },
            Err(_) => RequestTarget {
                uri: request.path_and_query(),
                host: self.base_url.host_str().unwrap_or_default().to_string(),
            },
        }
    }
}

/// Saturates instead of truncating for absurd timeouts.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
