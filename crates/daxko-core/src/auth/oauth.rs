use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::config::PartnerCredentials;
use crate::error::{Error, Result};

const PARTNER_TOKEN_PATH: &str = "partners/oauth2/token";
const MEMBER_TOKEN_PATH: &str = "partners/oauth2/members/token";

/// OAuth2 client for the partner token endpoints.
///
/// Both grants authenticate with the long-lived refresh token as the
/// bearer credential. Tokens are fetched fresh on every call; nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    credentials: PartnerCredentials,
}

impl OAuthClient {
    pub fn new(credentials: PartnerCredentials) -> Result<Self> {
        let http = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self { http, credentials })
    }

    pub fn credentials(&self) -> &PartnerCredentials {
        &self.credentials
    }

    /// Fetch a partner access token via the client-credentials grant,
    /// scoped to the configured client id.
    pub async fn partner_token(&self) -> Result<String> {
        let scope = format!("client:{}", self.credentials.client_id());
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.user()),
            ("client_secret", self.credentials.secret()),
            ("scope", scope.as_str()),
        ];
        self.token_grant(PARTNER_TOKEN_PATH, &form)
            .await
            .map_err(|err| {
                error!("partner token request failed: {err}");
                err
            })
    }

    /// Exchange an authorization code for a member access token.
    pub async fn member_token(&self, code: &str, redirect_uri: &str) -> Result<String> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.credentials.user()),
            ("client_secret", self.credentials.secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        self.token_grant(MEMBER_TOKEN_PATH, &form)
            .await
            .map_err(|err| {
                error!("member token exchange failed: {err}");
                err
            })
    }

    async fn token_grant(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let url = self.credentials.endpoint(path)?;
        let response = self
            .http
            .post(url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.credentials.refresh_token()),
            )
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "".into());
            return Err(Error::TokenEndpoint { status, body });
        }

        let body = response.text().await?;
        let grant: TokenGrant = serde_json::from_str(&body)?;
        Ok(grant.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn credentials(server: &MockServer) -> PartnerCredentials {
        PartnerCredentials::new(
            format!("{}/v3/", server.base_url()),
            "api-user",
            "api-secret",
            "4032",
            "refresh-tok",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn partner_token_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3/partners/oauth2/token")
                .header("authorization", "Bearer refresh-tok")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_contains("grant_type=client_credentials")
                .body_contains("client_id=api-user")
                .body_contains("client_secret=api-secret")
                .body_contains("scope=client%3A4032");
            then.status(200).json_body_obj(&serde_json::json!({
                "access_token": "partner-abc",
                "token_type": "bearer",
                "expires_in": 3600
            }));
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        let token = client.partner_token().await.unwrap();

        mock.assert();
        assert_eq!(token, "partner-abc");
    }

    #[tokio::test]
    async fn partner_token_fetched_fresh_each_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v3/partners/oauth2/token");
            then.status(200)
                .json_body_obj(&serde_json::json!({ "access_token": "partner-abc" }));
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        client.partner_token().await.unwrap();
        client.partner_token().await.unwrap();

        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn partner_token_endpoint_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/partners/oauth2/token");
            then.status(400).body("invalid_client");
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        let err = client.partner_token().await.unwrap_err();

        match err {
            Error::TokenEndpoint { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn partner_token_missing_field_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/partners/oauth2/token");
            then.status(200)
                .json_body_obj(&serde_json::json!({ "token_type": "bearer" }));
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        let err = client.partner_token().await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn member_token_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3/partners/oauth2/members/token")
                .header("authorization", "Bearer refresh-tok")
                .body_contains("grant_type=authorization_code")
                .body_contains("code=auth-code-123")
                .body_contains("redirect_uri=https%3A%2F%2Fexample.org%2Fcallback");
            then.status(200)
                .json_body_obj(&serde_json::json!({ "access_token": "member-xyz" }));
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        let token = client
            .member_token("auth-code-123", "https://example.org/callback")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(token, "member-xyz");
    }

    #[tokio::test]
    async fn member_token_endpoint_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/partners/oauth2/members/token");
            then.status(401).body("code expired");
        });

        let client = OAuthClient::new(credentials(&server)).unwrap();
        let err = client
            .member_token("stale-code", "https://example.org/callback")
            .await
            .unwrap_err();

        match err {
            Error::TokenEndpoint { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "code expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
