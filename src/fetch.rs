//! Fetch stage: retrieve page bodies over HTTP.
//!
//! The fetch stage sits behind the [`FetchProvider`] capability trait so the
//! pipeline can swap the transport for a stub in tests. The default
//! implementation is a blocking reqwest client.

use std::ops::Range;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::Error;

#[cfg(test)]
use mockall::automock;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_SUCCESS: Range<u16> = 200..300;

/// Capability interface for the fetch stage.
///
/// Implementations return the content body for a URL, or `None` when the
/// resource could not be retrieved for any reason. Fetch failure is not an
/// error condition: it degrades the single link's title, never the pipeline.
/// Plain closures qualify through the blanket impl.
#[cfg_attr(test, automock)]
pub trait FetchProvider {
    fn fetch(&self, url: &str) -> Option<String>;
}

impl<F> FetchProvider for F
where
    F: Fn(&str) -> Option<String>,
{
    fn fetch(&self, url: &str) -> Option<String> {
        self(url)
    }
}

/// Blocking HTTP fetch built on reqwest.
///
/// Any transport error, timeout, body-decode failure, or response status
/// outside the configured success range degrades to `None`.
pub struct HttpFetchProvider {
    client: reqwest::blocking::Client,
    success: Range<u16>,
}

impl HttpFetchProvider {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            success: DEFAULT_SUCCESS,
        })
    }

    /// Override the status range treated as success. Default is the 2xx
    /// class.
    pub fn with_success_range(mut self, success: Range<u16>) -> Self {
        self.success = success;
        self
    }
}

impl FetchProvider for HttpFetchProvider {
    fn fetch(&self, url: &str) -> Option<String> {
        let target = normalize(url)?;
        let response = match self.client.get(target).send() {
            Ok(response) => response,
            Err(err) => {
                debug!(url, error = %err, "fetch failed");
                return None;
            }
        };
        let status = response.status().as_u16();
        if !self.success.contains(&status) {
            debug!(url, status, "response status outside success range");
            return None;
        }
        response.text().ok()
    }
}

/// The href grammar admits naked domains like `example.com`, which have no
/// scheme for the client to dial. A scheme-less href is retried with an
/// `http://` prefix; anything still unparseable is treated as unfetchable.
fn normalize(href: &str) -> Option<Url> {
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{href}")).ok()
        }
        Err(err) => {
            debug!(href, error = %err, "unparseable href");
            None
        }
    }
}
