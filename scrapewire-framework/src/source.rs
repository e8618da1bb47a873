//! The source adapter seam.

use async_trait::async_trait;

use scrapewire_common::{RawSnapshot, ScrapeError};

/// Obtains one raw snapshot per invocation from a monitored source.
///
/// A source is owned by its [`Exporter`](crate::Exporter) and only ever called
/// under the exporter's scrape guard, so `fetch` takes `&mut self` and may keep
/// state between cycles (a refreshed process table, a cached credential).
///
/// Implementations report every failure to the caller and never retry.
#[async_trait]
pub trait Source: Send + 'static {
    /// Short human-readable target, used in logs (a URI, a pid, a script path).
    fn describe(&self) -> String;

    /// Perform one fetch.
    async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError>;
}
