//! Title stage: pull a page title out of a fetched content body.
//!
//! Three interchangeable [`ParseProvider`] strategies are shipped. They must
//! agree on well-formed input; on malformed input the strict XML parser
//! fails closed where the tolerant parsers may still recover a title, and
//! that divergence is part of the contract, not a bug.

use scraper::{Html, Selector};
use tracing::trace;

use crate::fetch::FetchProvider;

#[cfg(test)]
use mockall::automock;

/// Capability interface for the parse stage.
///
/// Implementations return the text of the first `<title>` element in a
/// content body, or `None` when no title can be determined. Parse failure
/// is not an error condition. Plain closures qualify through the blanket
/// impl.
#[cfg_attr(test, automock)]
pub trait ParseProvider {
    fn title(&self, body: &str) -> Option<String>;
}

impl<F> ParseProvider for F
where
    F: Fn(&str) -> Option<String>,
{
    fn title(&self, body: &str) -> Option<String> {
        self(body)
    }
}

/// Strict structured-markup parser.
///
/// The body must be well-formed XML (XHTML); any parse error fails closed
/// with `None`, including truncated documents whose title element is
/// otherwise intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTitleParser;

impl ParseProvider for XmlTitleParser {
    fn title(&self, body: &str) -> Option<String> {
        let doc = match roxmltree::Document::parse(body) {
            Ok(doc) => doc,
            Err(err) => {
                trace!(error = %err, "body is not well-formed xml");
                return None;
            }
        };
        doc.descendants()
            .find(|node| node.is_element() && node.tag_name().name() == "title")
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
    }
}

/// Tolerant lexical scan.
///
/// Locates the first `<title...>` open tag and the following `</title`
/// case-insensitively, ignoring whatever malformed markup surrounds them.
/// Still `None` when the title tag is never terminated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanningTitleParser;

impl ParseProvider for ScanningTitleParser {
    fn title(&self, body: &str) -> Option<String> {
        // ASCII-folding preserves byte offsets into the original body.
        let folded = body.to_ascii_lowercase();
        let open = folded.find("<title")?;
        let content = open + folded[open..].find('>')? + 1;
        let close = content + folded[content..].find("</title")?;
        let title = body[content..close].trim();
        (!title.is_empty()).then(|| title.to_string())
    }
}

/// DOM-based parser using html5ever via scraper.
///
/// Tolerant of real-world HTML the way a browser is; the pipeline default,
/// since chat links overwhelmingly point at HTML rather than XHTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTitleParser;

impl ParseProvider for HtmlTitleParser {
    fn title(&self, body: &str) -> Option<String> {
        let doc = Html::parse_document(body);
        let selector = Selector::parse("title").ok()?;
        doc.select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

/// Resolve one optional title per URL, lazily, in input order.
///
/// Per-URL protocol: fetch the body; on fetch failure yield `None` and move
/// on to the next URL; otherwise parse and yield the (possibly absent)
/// title. A failed URL never aborts resolution of its siblings.
pub fn titles<'a, F, P>(
    urls: &'a [String],
    fetch_provider: &'a F,
    parse_provider: &'a P,
) -> impl Iterator<Item = Option<String>> + 'a
where
    F: FetchProvider + ?Sized,
    P: ParseProvider + ?Sized,
{
    urls.iter().map(move |url| {
        let body = fetch_provider.fetch(url)?;
        parse_provider.title(&body)
    })
}
