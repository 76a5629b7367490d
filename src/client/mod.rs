//! Resource client for the parish platform API.
//!
//! Every endpoint goes through [`ApiClient::call`], which attaches the
//! current session token, serializes the body as JSON and normalizes every
//! outcome into either the parsed response or a [`ClientError`]. There is no
//! retry and no caching: each call is one round trip.

mod endpoints;

use reqwest::{header, Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("paroquia/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue one request and decode the JSON response.
    pub async fn call<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);

        // Read at call time so a cleared session is never reused
        if let Some(token) = self.session.token() {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "Request failed to complete");
            ClientError::Network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = ClientError::from_response(status, &bytes);
            warn!(%method, path, %status, error = %err, "Server rejected request");
            return Err(err);
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ClientError::Protocol(format!(
                "empty response body from {} {}",
                method, path
            )));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(%method, path, error = %e, "Failed to decode response");
            ClientError::Protocol(format!("{} {}: {}", method, path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.call::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(Method::PATCH, path, Some(body)).await
    }
}
