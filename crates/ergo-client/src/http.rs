//! Blocking JSON transport shared by the node and explorer clients.

use crate::error::{ClientError, ClientResult};
use reqwest::blocking::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::debug;

/// Header carrying the node API key.
const API_KEY_HEADER: &str = "api_key";

pub(crate) struct JsonTransport {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl JsonTransport {
    pub(crate) fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Builder(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let request = self.with_key(self.http.get(&url));
        self.execute(&url, request)
    }

    pub(crate) fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let request = self.with_key(self.http.post(&url).json(body));
        self.execute(&url, request)
    }

    fn execute<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().map_err(|source| ClientError::Http {
            endpoint: url.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().map_err(|source| ClientError::Http {
            endpoint: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        decode(url, &body)
    }
}

/// Parse a response body, naming the endpoint on failure.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
