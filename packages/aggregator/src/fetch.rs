//! HTTP fetching and RSS parsing.
//!
//! The fetcher sits behind a trait so scheduler tests can substitute a
//! mock. The HTTP implementation carries an identifying `User-Agent`
//! and a request timeout, reads the full body, and parses it as an
//! RSS 2.0 document.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rss::Channel;
use tokio_util::sync::CancellationToken;
use url::Url;

/// User-Agent sent with every feed request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid feed url {url}: {source}")]
    Request {
        url: String,
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("failed to read body from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
    #[error("failed to parse feed from {url}: {source}")]
    Parse { url: String, source: rss::Error },
    #[error("fetch of {url} was cancelled")]
    Cancelled { url: String },
}

/// A parsed RSS document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RssItem>,
}

/// One `<item>`, fields exactly as they appeared in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

impl From<Channel> for RssDocument {
    fn from(channel: Channel) -> Self {
        let items = channel
            .items()
            .iter()
            .map(|item| RssItem {
                title: item.title().map(str::to_string),
                link: item.link().map(str::to_string),
                description: item.description().map(str::to_string),
                pub_date: item.pub_date().map(str::to_string),
            })
            .collect();

        // Channel-level fields are entity-decoded; item fields are
        // passed through raw. See DESIGN.md.
        RssDocument {
            title: html_escape::decode_html_entities(channel.title()).into_owned(),
            link: channel.link().to_string(),
            description: html_escape::decode_html_entities(channel.description()).into_owned(),
            items,
        }
    }
}

#[async_trait]
pub trait FetchFeed: Send + Sync {
    /// Fetch and parse the feed at `url`. The call observes `cancel`
    /// so a caller can abort mid-flight.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<RssDocument, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchFeed for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<RssDocument, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let request = async {
            let response =
                self.client
                    .get(parsed)
                    .send()
                    .await
                    .map_err(|source| FetchError::Transport {
                        url: url.to_string(),
                        source,
                    })?;

            let body = response
                .bytes()
                .await
                .map_err(|source| FetchError::Decode {
                    url: url.to_string(),
                    source,
                })?;

            let channel = Channel::read_from(&body[..]).map_err(|source| FetchError::Parse {
                url: url.to_string(),
                source,
            })?;

            Ok(RssDocument::from(channel))
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled {
                url: url.to_string(),
            }),
            document = request => document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const FIXTURE: &str = include_str!("../tests/support/rss_feed_example.xml");

    #[test]
    fn it_converts_a_channel_into_a_document() {
        let channel = Channel::from_str(FIXTURE).unwrap();

        let document = RssDocument::from(channel);

        assert_eq!(document.title, "Tom & Jerry's Tech Digest");
        assert_eq!(document.link, "https://example.com");
        assert_eq!(document.items.len(), 3);
        assert_eq!(
            document.items[0].pub_date.as_deref(),
            Some("Mon, 02 Jan 2006 15:04:05 -0700")
        );
    }

    #[test]
    fn channel_fields_are_entity_decoded_but_item_fields_are_not() {
        let channel = Channel::from_str(FIXTURE).unwrap();

        let document = RssDocument::from(channel);

        assert_eq!(document.title, "Tom & Jerry's Tech Digest");
        assert_eq!(document.description, "News & views");
        // The second item's title carries an entity; it stays raw.
        assert_eq!(document.items[1].title.as_deref(), Some("Cats &amp; Mice"));
    }

    #[test]
    fn items_keep_document_order() {
        let channel = Channel::from_str(FIXTURE).unwrap();

        let document = RssDocument::from(channel);

        let links: Vec<_> = document
            .items
            .iter()
            .map(|i| i.link.as_deref().unwrap())
            .collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/posts/1",
                "https://example.com/posts/2",
                "https://example.com/posts/3",
            ]
        );
    }

    #[test]
    fn user_agent_carries_the_package_version() {
        assert!(USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn request_error_on_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let cancel = CancellationToken::new();

        let err = fetcher.fetch("not a url", &cancel).await.unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
    }
}
