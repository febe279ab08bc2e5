use thiserror::Error;

/// Longest server body kept in an error message.
const MAX_BODY_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
}

impl UpstreamError {
    /// Build a [`UpstreamError::Server`], clipping long bodies (error pages
    /// are often full HTML documents).
    pub fn server(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(MAX_BODY_CHARS) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body.to_string(),
        };
        UpstreamError::Server { status, body }
    }
}
