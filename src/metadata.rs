//! Aggregation of the extractor stages into one serializable payload.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{emoticons, hrefs, mentions, Extractor};
use crate::fetch::{FetchProvider, HttpFetchProvider};
use crate::title::{titles, HtmlTitleParser, ParseProvider};
use crate::Error;

/// A hyperlink and its resolved page title.
///
/// `title` serializes as `null` when resolution failed for that one link;
/// the link itself is still reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
}

/// Metadata extracted from one chat message.
///
/// A field is `None`, and omitted from the serialized form entirely, when
/// its extractor found nothing. `None` and "present but empty" are distinct
/// on purpose: a fully unresolvable message serializes to `{}`, never to
/// empty arrays. Sequences keep scan order and retain duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoticons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
}

impl MessageMetadata {
    /// True when no metadata of any kind was found in the message.
    pub fn is_empty(&self) -> bool {
        self.emoticons.is_none() && self.mentions.is_none() && self.links.is_none()
    }

    /// Serialize to the JSON payload shape:
    ///
    /// ```json
    /// {
    ///   "mentions": ["mary", "geetha"],
    ///   "emoticons": ["mindblown"],
    ///   "links": [{"url": "https://example.com", "title": "Page title"}]
    /// }
    /// ```
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Composes the three extractors and the title resolver over one message.
///
/// Every stage is injected behind its capability trait and independently
/// substitutable through the `with_*` methods, so tests can stub the
/// network or any extractor without touching the rest of the pipeline.
pub struct MetadataPipeline {
    emoticon_provider: Box<dyn Extractor>,
    mention_provider: Box<dyn Extractor>,
    href_provider: Box<dyn Extractor>,
    fetch_provider: Box<dyn FetchProvider>,
    parse_provider: Box<dyn ParseProvider>,
}

impl MetadataPipeline {
    /// Pipeline wired with the default stages: the depth-tracking emoticon
    /// scan, the mention and href extractors from [`crate::extract`], a
    /// blocking HTTP fetch, and DOM-based title parsing.
    ///
    /// Only HTTP client construction can fail here; no network traffic
    /// happens until [`Self::metadata`] runs over a message with links.
    pub fn new() -> Result<Self, Error> {
        Ok(Self {
            emoticon_provider: Box::new(|text: &str| emoticons(text).collect()),
            mention_provider: Box::new(|text: &str| mentions(text).collect()),
            href_provider: Box::new(|text: &str| hrefs(text).collect()),
            fetch_provider: Box::new(HttpFetchProvider::new()?),
            parse_provider: Box::new(HtmlTitleParser),
        })
    }

    pub fn with_emoticon_provider(mut self, provider: impl Extractor + 'static) -> Self {
        self.emoticon_provider = Box::new(provider);
        self
    }

    pub fn with_mention_provider(mut self, provider: impl Extractor + 'static) -> Self {
        self.mention_provider = Box::new(provider);
        self
    }

    pub fn with_href_provider(mut self, provider: impl Extractor + 'static) -> Self {
        self.href_provider = Box::new(provider);
        self
    }

    pub fn with_fetch_provider(mut self, provider: impl FetchProvider + 'static) -> Self {
        self.fetch_provider = Box::new(provider);
        self
    }

    pub fn with_parse_provider(mut self, provider: impl ParseProvider + 'static) -> Self {
        self.parse_provider = Box::new(provider);
        self
    }

    /// Extract all metadata from one message.
    ///
    /// Never fails for message-content reasons; the worst case for an
    /// unresolvable message is an empty payload. Each lazy extractor is
    /// materialized exactly once before the emptiness check and the
    /// payload build, and link titles resolve sequentially in href scan
    /// order.
    pub fn metadata(&self, message: &str) -> MessageMetadata {
        let emoticons = self.emoticon_provider.extract(message);
        let mentions = self.mention_provider.extract(message);
        let urls = self.href_provider.extract(message);

        let resolved = titles(
            &urls,
            self.fetch_provider.as_ref(),
            self.parse_provider.as_ref(),
        );
        let links: Vec<Link> = urls
            .iter()
            .cloned()
            .zip(resolved)
            .map(|(url, title)| Link { url, title })
            .collect();

        debug!(
            emoticons = emoticons.len(),
            mentions = mentions.len(),
            links = links.len(),
            "extracted message metadata"
        );

        MessageMetadata {
            emoticons: (!emoticons.is_empty()).then_some(emoticons),
            mentions: (!mentions.is_empty()).then_some(mentions),
            links: (!links.is_empty()).then_some(links),
        }
    }

    /// Extract and serialize in one step.
    pub fn json(&self, message: &str) -> Result<String, Error> {
        self.metadata(message).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metadata_serializes_to_empty_object() {
        let meta = MessageMetadata::default();
        assert!(meta.is_empty());
        assert_eq!(meta.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_absent_fields_are_omitted_not_empty() {
        let meta = MessageMetadata {
            mentions: Some(vec!["mary".to_string()]),
            ..Default::default()
        };
        assert_eq!(meta.to_json().unwrap(), r#"{"mentions":["mary"]}"#);
    }

    #[test]
    fn test_link_title_serializes_as_null_when_absent() {
        let meta = MessageMetadata {
            links: Some(vec![Link {
                url: "https://example.com".to_string(),
                title: None,
            }]),
            ..Default::default()
        };
        assert_eq!(
            meta.to_json().unwrap(),
            r#"{"links":[{"url":"https://example.com","title":null}]}"#
        );
    }

    #[test]
    fn test_metadata_roundtrips_through_json() {
        let meta = MessageMetadata {
            emoticons: Some(vec!["mindblown".to_string()]),
            mentions: Some(vec!["mary".to_string(), "geetha".to_string()]),
            links: Some(vec![Link {
                url: "https://example.com".to_string(),
                title: Some("Page title".to_string()),
            }]),
        };
        let parsed: MessageMetadata =
            serde_json::from_str(&meta.to_json().unwrap()).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_pipeline_preserves_duplicates_and_order() {
        let pipeline = MetadataPipeline::new()
            .unwrap()
            .with_fetch_provider(|_: &str| None::<String>);
        let meta = pipeline.metadata("@mary (wave) @mary (wave)");
        assert_eq!(
            meta.mentions,
            Some(vec!["mary".to_string(), "mary".to_string()])
        );
        assert_eq!(
            meta.emoticons,
            Some(vec!["wave".to_string(), "wave".to_string()])
        );
        assert_eq!(meta.links, None);
    }

    #[test]
    fn test_pipeline_substitutes_extractors() {
        let pipeline = MetadataPipeline::new()
            .unwrap()
            .with_emoticon_provider(|_: &str| vec!["stubbed".to_string()])
            .with_fetch_provider(|_: &str| None::<String>);
        let meta = pipeline.metadata("no emoticons here");
        assert_eq!(meta.emoticons, Some(vec!["stubbed".to_string()]));
    }
}
