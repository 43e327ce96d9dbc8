//! Wrapper around the keyword-search endpoint.
//!
//! Shapes one page request (query, query mode, cursor, API-key header) and
//! delegates to the shared HTTP client. Retry and pacing policy live in
//! [`crate::twitter::harvest`], so every call here is single-shot.

use std::borrow::Cow;

use driftnet_config::SearchSettings;
use driftnet_http::header::{HeaderName, HeaderValue};
use driftnet_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::twitter::types::SearchPage;

#[derive(Clone)]
pub struct SearchApi {
    http: HttpClient,
    api_key: HeaderValue,
    query_type: String,
}

impl SearchApi {
    pub fn new(settings: &SearchSettings) -> Result<Self, HttpError> {
        let http = HttpClient::new(&settings.endpoint)?;
        let mut api_key = HeaderValue::from_str(&settings.api_key)
            .map_err(|e| HttpError::Build(format!("invalid API key header: {e}")))?;
        api_key.set_sensitive(true);
        Ok(Self {
            http,
            api_key,
            query_type: settings.query_type.clone(),
        })
    }

    /// Fetch one page of results for `keyword` starting at `cursor`
    /// (empty cursor means the first page).
    pub async fn search(&self, keyword: &str, cursor: &str) -> Result<SearchPage, HttpError> {
        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", keyword.into()),
            ("queryType", Cow::Borrowed(self.query_type.as_str())),
            ("cursor", cursor.into()),
        ];

        self.http
            .get_json(
                "",
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: HeaderName::from_static("x-api-key"),
                        value: self.api_key.clone(),
                    }),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await
    }
}
