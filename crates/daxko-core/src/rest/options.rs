use std::collections::BTreeMap;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::error::Result;

/// Per-request overrides for [`ApiClient::request`](crate::rest::ApiClient::request).
///
/// Caller-supplied fields always win: a header set here replaces whatever
/// the dispatcher would send, and an `Authorization` header (matched
/// case-insensitively) suppresses the automatic partner token fetch.
/// When both a form and a raw body are set, the form is sent.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    headers: BTreeMap<String, String>,
    body: Option<String>,
    form: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any previous value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Authenticate the request with a caller-held bearer token.
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Set a raw request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a JSON body and set the content type accordingly.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self.header(CONTENT_TYPE.as_str(), "application/json"))
    }

    /// Append a form field; the request is sent urlencoded when any field
    /// is present.
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    pub fn has_authorization(&self) -> bool {
        self.headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(AUTHORIZATION.as_str()))
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        BTreeMap<String, String>,
        Option<String>,
        Option<Vec<(String, String)>>,
    ) {
        (self.headers, self.body, self.form)
    }
}
