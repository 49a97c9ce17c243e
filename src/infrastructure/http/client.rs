use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::value_objects::Vendor;

/// Base URL, default headers and status classification for one vendor API.
#[derive(Clone)]
pub struct ApiClient {
    vendor: Vendor,
    base_url: String,
    headers: Vec<(String, String)>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("vendor", &self.vendor)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.len())
            .finish()
    }
}

impl ApiClient {
    pub fn new(vendor: Vendor, base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            vendor,
            base_url,
            headers: Vec::new(),
            transport,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`; absolute inputs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends a request and returns the response whatever its status.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> GitgateResult<HttpResponse> {
        let mut request = HttpRequest::new(method, self.url(path));
        for (name, value) in &self.headers {
            request = request.with_header(name.clone(), value.clone());
        }
        if let Some(body) = body {
            request = request.with_json(body);
        }
        self.transport.send(request).await
    }

    pub async fn get(&self, path: &str) -> GitgateResult<HttpResponse> {
        self.send(HttpMethod::Get, path, None).await
    }

    /// GET that fails on any non-2xx status.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: &str) -> GitgateResult<T> {
        let response = self.get(path).await?;
        self.expect_success(response, resource)?.json()
    }

    /// GET that maps 404 to `None`.
    pub async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
    ) -> GitgateResult<Option<T>> {
        let response = self.get(path).await?;
        if response.status == 404 {
            debug!(vendor = %self.vendor, resource, "Resource not found");
            return Ok(None);
        }
        self.expect_success(response, resource)?.json().map(Some)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> GitgateResult<T> {
        let body = serde_json::to_value(body)?;
        let response = self.send(HttpMethod::Post, path, Some(body)).await?;
        self.expect_success(response, resource)?.json()
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> GitgateResult<T> {
        let body = serde_json::to_value(body)?;
        let response = self.send(HttpMethod::Patch, path, Some(body)).await?;
        self.expect_success(response, resource)?.json()
    }

    pub fn expect_success(&self, response: HttpResponse, resource: &str) -> GitgateResult<HttpResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(self.error_for(&response, resource))
        }
    }

    /// Maps a failed response onto the error taxonomy.
    pub fn error_for(&self, response: &HttpResponse, resource: &str) -> GitgateError {
        let vendor = self.vendor.label().to_string();
        let message = response.error_message();
        match response.status {
            401 => GitgateError::AuthenticationFailed { vendor, message },
            403 => GitgateError::RateLimitedOrForbidden { vendor, message },
            404 => GitgateError::remote_not_found(vendor, resource),
            // Secondary rate limits come back as 429 on both vendors
            429 => GitgateError::RateLimitedOrForbidden { vendor, message },
            status => GitgateError::vendor_api(
                vendor,
                Some(status),
                format!("{} returned {}: {}", resource, status, message),
            ),
        }
    }
}
