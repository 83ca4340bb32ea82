use thiserror::Error;

/// Anything that stops a chapter list from being loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("api answered code {code} ({status}) for {url}")]
    Status { url: String, code: i64, status: String },
    #[error("response from {url} has no surahs")]
    MissingSurahs { url: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("player command is empty")]
    EmptyPlayer,
    #[error("player command `{0}` has no {{url}} placeholder")]
    MissingUrlPlaceholder(String),
}
