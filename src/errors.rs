use thiserror::Error;

/// Failures at the HTTP boundary (quote provider and language model).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },

    #[error("no data returned for {0}")]
    NoData(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("market_data.json is missing at {0}. Run `fetch` first.")]
    MissingSnapshot(String),

    #[error("{0} is required to generate AI summaries")]
    MissingCredential(&'static str),

    #[error("unable to build language model client: {0}")]
    Client(String),

    #[error("language model request failed: {0}")]
    Request(#[from] FetchError),

    #[error("language model returned an empty response")]
    EmptyResponse,
}
