//! `ResourceSource` implementation over HTTP.

use std::future::Future;
use std::time::Duration;

use url::Url;

use hunterdash_app::ports::ResourceSource;
use hunterdash_domain::error::DashError;
use hunterdash_domain::query::Query;
use hunterdash_domain::resource::{Page, Resource, ResourceKind};

use crate::envelope::{decode_page, error_message};
use crate::error::HttpError;

/// Configuration for the HTTP adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend origin, optionally with a path prefix (e.g. `http://localhost:8080`).
    pub base_url: String,
    /// Bearer token sent with every request.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Config {
    /// Build an [`HttpResourceSource`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `base_url` does not parse, or
    /// [`HttpError::Client`] if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpResourceSource, HttpError> {
        let base_url = Url::parse(self.base_url.trim_end_matches('/'))?;
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(HttpError::Client)?;
        Ok(HttpResourceSource {
            client,
            base_url,
            access_token: self.access_token,
        })
    }
}

/// Lists users and résumés from the job-hunter REST API.
#[derive(Debug, Clone)]
pub struct HttpResourceSource {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpResourceSource {
    /// The URL a list request for `kind` with `query` is sent to.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the joined URL is invalid.
    pub fn list_url(&self, kind: ResourceKind, query: &Query) -> Result<Url, HttpError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{}", kind.collection_path()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.pairs());
        }
        Ok(url)
    }

    async fn get_page<R: Resource>(&self, url: Url) -> Result<Page<R>, HttpError> {
        tracing::debug!(resource = %R::KIND, url = %url, "GET");
        let mut request = self.client.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(HttpError::Request)?;
        let status = response.status();
        let body = response.bytes().await.map_err(HttpError::Request)?;

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        decode_page(&body)
    }
}

impl ResourceSource for HttpResourceSource {
    fn fetch_page<R: Resource>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Page<R>, DashError>> + Send {
        let url = self.list_url(R::KIND, query);
        async move {
            let page = self.get_page::<R>(url?).await?;
            Ok(page)
        }
    }
}
