use async_trait::async_trait;

use crate::auth::OAuthClient;
use crate::error::Result;

/// Source of partner access tokens for API dispatch.
///
/// The default source is [`OAuthClient`], which performs a fresh
/// client-credentials grant on every call. Implement this trait to swap in
/// a cached or pre-issued token without touching the dispatch path.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn partner_token(&self) -> Result<String>;
}

#[async_trait]
impl TokenSource for OAuthClient {
    async fn partner_token(&self) -> Result<String> {
        self.partner_token().await
    }
}
