use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;

use crate::config::PartnerCredentials;
use crate::error::{Error, Result};
use crate::rest::decode_json_body;

const MEMBER_INFO_PATH: &str = "members/me";

/// Member-scoped endpoints, authenticated with a member access token
/// obtained through the authorization-code grant.
#[derive(Debug, Clone)]
pub struct MemberService {
    http: Client,
    credentials: PartnerCredentials,
}

impl MemberService {
    pub fn new(credentials: PartnerCredentials) -> Result<Self> {
        let http = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self { http, credentials })
    }

    /// Fetch the profile of the member the token belongs to. Failures are
    /// carried in the returned value only.
    pub async fn my_info(&self, member_token: &str) -> Result<Value> {
        let url = self.credentials.endpoint(MEMBER_INFO_PATH)?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {member_token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        let body = response.text().await?;
        decode_json_body(&body)
    }
}
