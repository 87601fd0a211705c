use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// `interpolate_to` was called with an empty target descriptor.
    #[error("no interpolation target given")]
    NoInterpolationTarget,

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not parse response body: {0}")]
    Json(#[from] serde_json::Error),
}
