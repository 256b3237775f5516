use std::path::PathBuf;
use std::time::Duration;

use scraper::Html;
use tracing::info;

use crate::error::SourceError;

/// Produces a parsed document for a URL.
pub trait MarkupSource {
    fn fetch(&self, url: &str) -> Result<Html, SourceError>;
}

/// Plain blocking GET. No retries.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpSource { client })
    }
}

impl MarkupSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Html, SourceError> {
        info!("Fetching listing: {}", url);
        let res = self.client.get(url).send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        let body = res.text()?;
        Ok(Html::parse_document(&body))
    }
}

/// A page saved to disk; the URL is ignored.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl MarkupSource for FileSource {
    fn fetch(&self, _url: &str) -> Result<Html, SourceError> {
        info!("Reading listing from {}", self.path.display());
        let body = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(Html::parse_document(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_parses_fixture() {
        let doc = FileSource::new("tests/fixtures/search.html").fetch("ignored").unwrap();
        let title = scraper::Selector::parse("title").unwrap();
        assert!(doc.select(&title).next().is_some());
    }

    #[test]
    fn missing_file_is_source_error() {
        let err = FileSource::new("tests/fixtures/nope.html").fetch("ignored").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("nope.html"));
    }
}
