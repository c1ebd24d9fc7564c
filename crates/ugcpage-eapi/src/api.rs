//! Collection endpoint client

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use ugcpage_core::{HttpConfig, HttpResponse, PagingError, paging_client, send};

use crate::auth::AccessToken;

/// One GET against the collection endpoint per call.
///
/// Implementations return every HTTP status as a response; only
/// connection-level failures are errors.
pub trait Gateway {
    /// URL being paged, for log lines
    fn url(&self) -> &str;

    fn get_page(
        &mut self,
        query: &[(String, String)],
        token: &AccessToken,
    ) -> Result<HttpResponse, PagingError>;
}

/// Enterprise API collection client over one kept-alive connection.
pub struct EapiClient {
    client: reqwest::Client,
    url: String,
}

impl EapiClient {
    pub fn new(url: String, http: &HttpConfig) -> Result<Self, PagingError> {
        Ok(Self {
            client: paging_client(http)?,
            url,
        })
    }
}

impl Gateway for EapiClient {
    fn url(&self) -> &str {
        &self.url
    }

    fn get_page(
        &mut self,
        query: &[(String, String)],
        token: &AccessToken,
    ) -> Result<HttpResponse, PagingError> {
        let request = self
            .client
            .get(&self.url)
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token.as_str());
        send(request)
    }
}

/// Render query parameters as `k=v&k=v` for logging
pub fn format_query(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
