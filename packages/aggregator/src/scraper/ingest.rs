//! Normalizes parsed feed items and writes them to the store.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::fetch::RssDocument;
use crate::models::{Feed, NewPost};
use crate::storage::{FeedStore, StoreError};

/// Outcome of ingesting one feed's document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Posts written for the first time.
    pub inserted: usize,
    /// Items already present (unique-violation no-ops).
    pub duplicates: usize,
    /// Items dropped before the write (empty title, missing link).
    pub skipped: usize,
    /// Items whose write failed for a reason other than duplication.
    pub failed: usize,
}

/// Ingest every item of `document` in document order. One bad item
/// never aborts its siblings; the report carries the tallies.
pub async fn ingest(store: &dyn FeedStore, feed: &Feed, document: &RssDocument) -> IngestReport {
    let mut report = IngestReport::default();

    for item in &document.items {
        let title = match item.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => {
                debug!(feed_id = %feed.id, link = ?item.link, "item has no title, skipping");
                report.skipped += 1;
                continue;
            }
        };

        // A post is keyed by (feed, url); an item without a link has
        // nothing to key on.
        let url = match item.link.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => {
                debug!(feed_id = %feed.id, title = %title, "item has no link, skipping");
                report.skipped += 1;
                continue;
            }
        };

        let new_post = NewPost {
            feed_id: feed.id,
            title: title.to_string(),
            url: url.to_string(),
            description: item
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            published_at: parse_pub_date(feed, item.pub_date.as_deref()),
        };

        match store.insert_post(&new_post).await {
            Ok(_) => report.inserted += 1,
            Err(StoreError::Duplicate) => report.duplicates += 1,
            Err(e) => {
                warn!(feed_id = %feed.id, url = %url, error = %e, "failed to insert post");
                report.failed += 1;
            }
        }
    }

    report
}

/// Publish dates arrive as RFC 1123 strings with a numeric zone, which
/// `parse_from_rfc2822` accepts. A missing or unparseable date falls
/// back to the ingestion time rather than a zero value.
fn parse_pub_date(feed: &Feed, pub_date: Option<&str>) -> DateTime<Utc> {
    match pub_date {
        Some(raw) => match DateTime::parse_from_rfc2822(raw) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(e) => {
                warn!(feed_id = %feed.id, pub_date = %raw, error = %e, "unparseable publish date, using current time");
                Utc::now()
            }
        },
        None => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn feed() -> Feed {
        Feed {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            name: "example".to_string(),
            url: "https://example.com/feed".to_string(),
            user_id: Uuid::new_v4(),
            last_fetched_at: None,
        }
    }

    #[test]
    fn it_parses_rfc1123_dates_with_numeric_zone() {
        let parsed = parse_pub_date(&feed(), Some("Mon, 02 Jan 2006 15:04:05 -0700"));

        let expected = Utc.with_ymd_and_hms(2006, 1, 2, 22, 4, 5).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn unparseable_dates_fall_back_to_now() {
        let before = Utc::now();
        let parsed = parse_pub_date(&feed(), Some("not a date"));
        let after = Utc::now();

        assert!(parsed >= before && parsed <= after);
    }

    #[test]
    fn missing_dates_fall_back_to_now() {
        let before = Utc::now();
        let parsed = parse_pub_date(&feed(), None);
        let after = Utc::now();

        assert!(parsed >= before && parsed <= after);
    }
}
