//! Lazy, restartable page iteration over vendor list endpoints.

use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::client::ApiClient;
use super::transport::HttpResponse;
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;

/// Upper bound on pages fetched by a single iteration.
pub const MAX_PAGES: usize = 1000;

/// Follows `Link: rel="next"` or `x-next-page` headers until exhausted or
/// until the page ceiling is reached.
#[derive(Debug, Clone)]
pub struct Paginator {
    client: ApiClient,
    first_url: String,
    next_url: Option<String>,
    pages_fetched: usize,
    max_pages: usize,
    resource: String,
}

impl Paginator {
    pub fn new(client: ApiClient, path: &str, resource: impl Into<String>) -> Self {
        let first_url = client.url(path);
        Self {
            client,
            next_url: Some(first_url.clone()),
            first_url,
            pages_fetched: 0,
            max_pages: MAX_PAGES,
            resource: resource.into(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGES);
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Rewinds to the first page.
    pub fn restart(&mut self) {
        self.next_url = Some(self.first_url.clone());
        self.pages_fetched = 0;
    }

    /// Fetches the next page, or `None` once iteration is over.
    pub async fn next_page(&mut self) -> GitgateResult<Option<HttpResponse>> {
        let url = match self.next_url.take() {
            Some(url) => url,
            None => return Ok(None),
        };

        let response = self.client.get(&url).await?;
        let response = self.client.expect_success(response, &self.resource)?;
        self.pages_fetched += 1;

        self.next_url = next_page_url(&url, &response);
        if self.next_url.is_some() && self.pages_fetched >= self.max_pages {
            warn!(
                resource = %self.resource,
                pages = self.pages_fetched,
                "Page ceiling reached, stopping pagination"
            );
            self.next_url = None;
        }
        debug!(resource = %self.resource, page = self.pages_fetched, "Fetched page");
        Ok(Some(response))
    }

    pub fn into_stream(self) -> impl Stream<Item = GitgateResult<HttpResponse>> {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok::<_, GitgateError>(page.map(|page| (page, pager)))
        })
    }

    /// Concatenates every page, each expected to be a JSON array.
    pub async fn collect_all<T: DeserializeOwned>(self) -> GitgateResult<Vec<T>> {
        let mut items = Vec::new();
        let mut pages = Box::pin(self.into_stream());
        while let Some(page) = pages.next().await {
            let page = page?;
            let batch: Vec<T> = page.json()?;
            items.extend(batch);
        }
        Ok(items)
    }
}

/// Resolves the URL of the page after `current`.
pub fn next_page_url(current: &str, response: &HttpResponse) -> Option<String> {
    if let Some(next) = response.header("link").and_then(parse_link_next) {
        return Some(next);
    }

    let next_page = response
        .header("x-next-page")
        .map(str::trim)
        .filter(|page| !page.is_empty())?;

    let mut url = Url::parse(current).ok()?;
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", next_page);
    Some(url.to_string())
}

/// Extracts the `rel="next"` target from an RFC 5988 `Link` header.
pub fn parse_link_next(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut sections = part.split(';');
        let target = sections.next()?.trim();
        let is_next = sections.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
