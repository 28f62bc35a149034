use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// An expected upstream payload was missing entirely.
    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("task failed: {0}")]
    Task(String),
}

impl ExtractError {
    /// Rate limits and upstream 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::Http { status, .. } => *status == 429 || (500..=504).contains(status),
            ExtractError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> ExtractError {
        ExtractError::Http {
            url: "https://zenn.dev/x".into(),
            status,
        }
    }

    #[test]
    fn retryable_statuses() {
        assert!(http(429).is_retryable());
        for status in 500..=504 {
            assert!(http(status).is_retryable(), "{status}");
        }
        for status in [400, 401, 403, 404, 410] {
            assert!(!http(status).is_retryable(), "{status}");
        }
        assert!(!ExtractError::NotFound("x").is_retryable());
        assert!(!ExtractError::Task("x".into()).is_retryable());
    }
}
