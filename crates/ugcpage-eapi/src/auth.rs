//! OAuth2 client-credentials token acquisition

use serde::Deserialize;
use ugcpage_core::http::body_detail;
use ugcpage_core::{HttpConfig, PagingError, send, token_client};

use crate::config::Credentials;

/// Access token issued by the identity endpoint.
///
/// Sent verbatim as the `Authorization` header value. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Source of access tokens; called once up front and again on every 401.
pub trait TokenSource {
    fn acquire(&self) -> Result<AccessToken, PagingError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges client credentials at `https://{host}/oauth2/token`.
///
/// Stateless: every call performs a fresh exchange on an unpooled client.
pub struct OAuthTokenProvider {
    client: reqwest::Client,
    token_url: String,
    credentials: Credentials,
}

impl OAuthTokenProvider {
    pub fn new(
        token_url: String,
        credentials: Credentials,
        http: &HttpConfig,
    ) -> Result<Self, PagingError> {
        Ok(Self {
            client: token_client(http)?,
            token_url,
            credentials,
        })
    }
}

impl TokenSource for OAuthTokenProvider {
    fn acquire(&self) -> Result<AccessToken, PagingError> {
        self.credentials.validate()?;
        log::info!("Get OAuth token url: {}", self.token_url);

        let request = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")]);
        let resp = send(request)?;
        log::info!("Get OAuth token status code: {}", resp.status);

        parse_token_response(resp.status, &resp.body)
    }
}

/// Interpret the identity endpoint's answer
fn parse_token_response(status: u16, body: &str) -> Result<AccessToken, PagingError> {
    if status != 200 {
        return Err(PagingError::Auth {
            status,
            body: body_detail(body),
        });
    }
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| PagingError::Decode(format!("token: {e}")))?;
    Ok(AccessToken(parsed.access_token))
}
