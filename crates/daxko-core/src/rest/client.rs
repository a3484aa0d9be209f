use std::sync::Arc;

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::auth::{OAuthClient, TokenSource};
use crate::config::PartnerCredentials;
use crate::error::{Error, Result};
use crate::rest::{decode_json_body, RequestOptions};

/// Generic dispatcher for partner API endpoints.
///
/// Requests without a caller-supplied `Authorization` header are
/// authenticated with a partner token pulled from the configured
/// [`TokenSource`] before dispatch. A token failure aborts the request and
/// is returned as [`Error::AuthBootstrap`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    credentials: PartnerCredentials,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(credentials: PartnerCredentials) -> Result<Self> {
        let http = Client::builder().user_agent(crate::USER_AGENT).build()?;
        let tokens = Arc::new(OAuthClient::new(credentials.clone())?);
        Ok(Self {
            http,
            credentials,
            tokens,
        })
    }

    /// Replace the token source, e.g. with a caching or pre-issued one.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn credentials(&self) -> &PartnerCredentials {
        &self.credentials
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, RequestOptions::new()).await
    }

    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    /// Dispatch a request to a path relative to the base URI.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        mut options: RequestOptions,
    ) -> Result<Value> {
        if !options.has_authorization() {
            let token = self
                .tokens
                .partner_token()
                .await
                .map_err(|err| Error::AuthBootstrap(Box::new(err)))?;
            options = options.bearer(&token);
        }

        let url = self.credentials.endpoint(path)?;
        debug!(%method, path, "dispatching API request");
        self.dispatch(method, url, options).await.map_err(|err| {
            error!("API request failed: {err}");
            err
        })
    }

    async fn dispatch(
        &self,
        method: Method,
        url: reqwest::Url,
        options: RequestOptions,
    ) -> Result<Value> {
        let (headers, body, form) = options.into_parts();

        let mut request = self.http.request(method, url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(fields) = &form {
            request = request.form(fields);
        } else if let Some(payload) = body {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let body = response.text().await?;
        decode_json_body(&body)
    }
}
