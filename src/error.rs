use thiserror::Error;

/// The markup source could not produce a document tree.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status code error: {code} {reason}")]
    Status { code: u16, reason: String },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The notifier rejected or failed to send the payload.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("relay rejected message ({code}): {body}")]
    Rejected { code: u16, body: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid selector `{css}`: {reason}")]
    Selector { css: String, reason: String },
    #[error("settings: {0}")]
    Settings(#[from] config::ConfigError),
}

/// Terminal error of one run. A run fails at the source, at delivery, or
/// before starting because of bad configuration; field defects never get here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    #[error("delivery failure: {0}")]
    DeliveryFailure(#[from] DeliveryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}
