use url::Url;

use crate::error::Result;

/// Credential set for one partner account on the membership platform.
///
/// Supplied once at construction and never mutated afterwards; client types
/// take their own copy. `user`/`secret` authenticate the partner account
/// against the grant endpoints, `client_id` is the numeric client the
/// account is scoped to, and `refresh_token` is the long-lived credential
/// used as the bootstrap bearer for token grants.
#[derive(Debug, Clone)]
pub struct PartnerCredentials {
    base_uri: Url,
    user: String,
    secret: String,
    client_id: String,
    refresh_token: String,
}

impl PartnerCredentials {
    /// Build a credential set, trimming every field and normalizing the
    /// base URI to carry a scheme and exactly one trailing slash.
    pub fn new(
        base_uri: impl AsRef<str>,
        user: impl Into<String>,
        secret: impl Into<String>,
        client_id: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            base_uri: normalize_base_uri(base_uri.as_ref())?,
            user: trimmed(user),
            secret: trimmed(secret),
            client_id: trimmed(client_id),
            refresh_token: trimmed(refresh_token),
        })
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Resolve a path relative to the base URI. Paths are expected to come
    /// without a leading slash; a leading slash rebases onto the host root.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_uri.join(path)?)
    }
}

fn trimmed(value: impl Into<String>) -> String {
    value.into().trim().to_owned()
}

fn normalize_base_uri(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let normalized = format!("{}/", with_scheme.trim_end_matches('/'));
    Ok(Url::parse(&normalized)?)
}
