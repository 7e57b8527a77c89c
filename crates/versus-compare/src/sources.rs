//! Citation ledger for one comparison run.

use std::collections::HashSet;

use crate::types::Source;

/// Item label attached to citations from follow-up queries.
pub const FOLLOW_UP_ITEM: &str = "Additional Research";

/// Accumulates cited URLs, keeping the first occurrence of each URL.
#[derive(Debug, Default)]
pub struct SourceLedger {
    seen: HashSet<String>,
    sources: Vec<Source>,
}

impl SourceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the citations returned by one item's research call.
    pub fn record_item_citations(&mut self, item: &str, urls: &[String]) {
        for (index, url) in urls.iter().enumerate() {
            self.push(Source {
                title: format!("Source {} for {item}", index + 1),
                url: url.clone(),
                item: item.to_owned(),
            });
        }
    }

    /// Records the citations returned by a follow-up query.
    pub fn record_follow_up_citations(&mut self, urls: &[String]) {
        for (index, url) in urls.iter().enumerate() {
            self.push(Source {
                title: format!("Additional source {}", index + 1),
                url: url.clone(),
                item: FOLLOW_UP_ITEM.to_owned(),
            });
        }
    }

    /// Adds `source` unless its URL was already recorded. Returns `true` if added.
    /// The URL is stored trimmed.
    pub fn push(&mut self, mut source: Source) -> bool {
        let url = source.url.trim();
        if url.is_empty() || self.seen.contains(url) {
            return false;
        }
        source.url = url.to_owned();
        self.seen.insert(source.url.clone());
        self.sources.push(source);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    #[must_use]
    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn duplicate_urls_across_items_are_kept_once() {
        let mut ledger = SourceLedger::new();
        ledger.record_item_citations("A", &urls(&["https://x.example", "https://a.example"]));
        ledger.record_item_citations("B", &urls(&["https://x.example", "https://b.example"]));
        ledger.record_follow_up_citations(&urls(&["https://a.example", "https://c.example"]));

        let sources = ledger.into_sources();
        let got: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            got,
            vec![
                "https://x.example",
                "https://a.example",
                "https://b.example",
                "https://c.example"
            ]
        );
        // First occurrence keeps its item tag.
        assert_eq!(sources[0].item, "A");
        assert_eq!(sources[0].title, "Source 1 for A");
        assert_eq!(sources[2].title, "Source 2 for B");
        assert_eq!(sources[3].item, FOLLOW_UP_ITEM);
        assert_eq!(sources[3].title, "Additional source 2");
    }

    #[test]
    fn blank_urls_are_ignored() {
        let mut ledger = SourceLedger::new();
        ledger.record_item_citations("A", &urls(&["", "  "]));
        assert!(ledger.is_empty());
    }

    #[test]
    fn push_reports_whether_added() {
        let mut ledger = SourceLedger::new();
        let source = Source {
            title: "t".into(),
            url: "https://x.example".into(),
            item: "A".into(),
        };
        assert!(ledger.push(source.clone()));
        assert!(!ledger.push(source));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stored_url_is_trimmed_and_matches_the_dedup_key() {
        let mut ledger = SourceLedger::new();
        ledger.record_item_citations("A", &urls(&["  https://x.example\n"]));
        ledger.record_item_citations("B", &urls(&["https://x.example"]));

        let sources = ledger.into_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://x.example");
        assert_eq!(sources[0].item, "A");
    }
}
