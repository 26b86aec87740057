//! chatmeta: metadata extraction for chat messages.
//!
//! Pulls three kinds of structured metadata out of a raw message string:
//! parenthesized emoticon tokens, `@handle` mentions, and hyperlinks with
//! their resolved page titles. Results aggregate into one JSON payload that
//! carries only the non-empty fields.
//!
//! Every pipeline stage sits behind a small capability trait
//! ([`Extractor`], [`FetchProvider`], [`ParseProvider`]) and can be swapped
//! independently, so tests run without a network and callers can replace
//! any stage. Extraction never fails on message content; fetch and parse
//! failures degrade to absent titles on the affected link only.
//!
//! ```no_run
//! use chatmeta::MetadataPipeline;
//!
//! # fn main() -> Result<(), chatmeta::Error> {
//! let pipeline = MetadataPipeline::new()?;
//! let json = pipeline.json("@clair check out (emoticons) at https://example.com/e")?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod fetch;
pub mod metadata;
pub mod title;

pub use extract::{emoticons, emoticons_regex, hrefs, mentions, Emoticons, Extractor};
pub use fetch::{FetchProvider, HttpFetchProvider};
pub use metadata::{Link, MessageMetadata, MetadataPipeline};
pub use title::{titles, HtmlTitleParser, ParseProvider, ScanningTitleParser, XmlTitleParser};

use thiserror::Error as ThisError;

/// Errors from the fallible edges of the pipeline.
///
/// Extraction itself never errors: absence of matches is an empty sequence
/// and per-link fetch/parse failures surface as absent titles instead.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    /// The metadata payload could not be serialized.
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}
