use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("invalid employee route id {0:?}")]
    InvalidRouteId(String),
    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to load config file '{path}': {message}")]
    Config { path: String, message: String },
}
