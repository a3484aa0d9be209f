mod oauth;
mod source;

pub use oauth::OAuthClient;
pub use source::TokenSource;
