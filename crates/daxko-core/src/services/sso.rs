use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{OAuthClient, TokenSource};
use crate::config::PartnerCredentials;
use crate::error::{Error, Result};
use crate::rest::decode_json_body;

const SSO_SETTINGS_PATH: &str = "partners/oauth2/members/settings";

/// Hosted membership sign-up page for a client.
pub fn hosted_sign_up_url(client_id: &str) -> String {
    format!("https://operations.daxko.com/online/{client_id}/memberships")
}

/// Hosted password-reset page for a client.
pub fn hosted_forgot_password_url(client_id: &str) -> String {
    format!("https://operations.daxko.com/online/{client_id}/forgotpassword")
}

#[derive(Debug, Serialize)]
struct SettingsEnvelope {
    settings: SsoSettings,
}

#[derive(Debug, Serialize)]
struct SsoSettings {
    valid_redirect_uris: Vec<String>,
    links: MemberLinks,
}

#[derive(Debug, Serialize)]
struct MemberLinks {
    sign_up: LinkTarget,
    forgot_password: LinkTarget,
}

#[derive(Debug, Serialize)]
struct LinkTarget {
    url: String,
}

fn settings_payload(link: &str, client_id: &str) -> SettingsEnvelope {
    SettingsEnvelope {
        settings: SsoSettings {
            valid_redirect_uris: vec![link.to_owned()],
            links: MemberLinks {
                sign_up: LinkTarget {
                    url: hosted_sign_up_url(client_id),
                },
                forgot_password: LinkTarget {
                    url: hosted_forgot_password_url(client_id),
                },
            },
        },
    }
}

/// Outcome of a redirect-link registration, successful or not at the
/// platform's discretion; a non-2xx answer is returned as an error.
#[derive(Debug)]
pub struct RedirectRegistration {
    pub status: StatusCode,
    pub body: Value,
}

/// Registers single-sign-on redirect links with the platform.
///
/// Failures are carried in the returned value only; callers decide how to
/// report them.
#[derive(Clone)]
pub struct SsoService {
    http: Client,
    credentials: PartnerCredentials,
    tokens: Arc<dyn TokenSource>,
}

impl SsoService {
    pub fn new(credentials: PartnerCredentials) -> Result<Self> {
        let http = Client::builder().user_agent(crate::USER_AGENT).build()?;
        let tokens = Arc::new(OAuthClient::new(credentials.clone())?);
        Ok(Self {
            http,
            credentials,
            tokens,
        })
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Register `link` as the valid OAuth2 redirect URI for this client,
    /// pointing sign-up and password-reset at the hosted pages.
    ///
    /// A token failure aborts the call before anything is sent.
    pub async fn register_redirect_link(&self, link: &str) -> Result<RedirectRegistration> {
        let token = self
            .tokens
            .partner_token()
            .await
            .map_err(|err| Error::AuthBootstrap(Box::new(err)))?;

        let url = self.credentials.endpoint(SSO_SETTINGS_PATH)?;
        let payload = settings_payload(link, self.credentials.client_id());
        let response = self
            .http
            .put(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let body = response.text().await?;
        Ok(RedirectRegistration {
            status,
            body: decode_json_body(&body)?,
        })
    }
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

    fn token_mock<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
        let body = serde_json::json!({ "access_token": token });
        server.mock(move |when, then| {
            when.method(POST).path("/v3/partners/oauth2/token");
            then.status(200).json_body_obj(&body);
        })
    }

    #[tokio::test]
    async fn registration_sends_settings_payload() {
        let server = MockServer::start();
        token_mock(&server, "partner-tok");
        let api = server.mock(|when, then| {
            when.method(PUT)
                .path("/v3/partners/oauth2/members/settings")
                .header("authorization", "Bearer partner-tok")
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "settings": {
                        "valid_redirect_uris": ["https://example.org/sso/callback"],
                        "links": {
                            "sign_up": {
                                "url": "https://operations.daxko.com/online/4032/memberships"
                            },
                            "forgot_password": {
                                "url": "https://operations.daxko.com/online/4032/forgotpassword"
                            }
                        }
                    }
                }));
            then.status(200)
                .json_body_obj(&serde_json::json!({ "updated": true }));
        });

        let service = SsoService::new(credentials(&server)).unwrap();
        let receipt = service
            .register_redirect_link("https://example.org/sso/callback")
            .await
            .unwrap();

        api.assert();
        assert_eq!(receipt.status, StatusCode::OK);
        assert_eq!(receipt.body["updated"], true);
    }

    #[test]
    fn hosted_links_derive_from_client_id_only() {
        assert_eq!(
            hosted_sign_up_url("4032"),
            "https://operations.daxko.com/online/4032/memberships"
        );
        assert_eq!(
            hosted_forgot_password_url("4032"),
            "https://operations.daxko.com/online/4032/forgotpassword"
        );
    }

    #[tokio::test]
    async fn registration_short_circuits_without_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/partners/oauth2/token");
            then.status(500).body("down");
        });
        let api = server.mock(|when, then| {
            when.method(PUT).path("/v3/partners/oauth2/members/settings");
            then.status(200).json_body_obj(&serde_json::json!({}));
        });

        let service = SsoService::new(credentials(&server)).unwrap();
        let err = service
            .register_redirect_link("https://example.org/sso/callback")
            .await
            .unwrap_err();

        api.assert_hits(0);
        assert!(matches!(err, Error::AuthBootstrap(_)));
    }

    #[tokio::test]
    async fn registration_failure_surfaces_status() {
        let server = MockServer::start();
        token_mock(&server, "partner-tok");
        server.mock(|when, then| {
            when.method(PUT).path("/v3/partners/oauth2/members/settings");
            then.status(422).body("bad uris");
        });

        let service = SsoService::new(credentials(&server)).unwrap();
        let err = service
            .register_redirect_link("https://example.org/sso/callback")
            .await
            .unwrap_err();

        match err {
            Error::Status { status, body } => {
                assert_eq!(status.as_u16(), 422);
                assert_eq!(body, "bad uris");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
