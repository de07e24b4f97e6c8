use hyper::Uri;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("`url` is required")]
    MissingUrl,

    #[error("invalid url: `{0}`")]
    InvalidUrl(String),

    #[error("unsupported url scheme in `{0}` (expected http:// or https://)")]
    UnsupportedScheme(String),

    #[error("`requests` must be a positive integer")]
    InvalidRequests,

    #[error("`concurrency` must be a positive integer")]
    InvalidConcurrency,
}

/// What to hit, how many times in total, and with how many workers at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target: Uri,
    total_requests: usize,
    concurrency: usize,
}

impl RunConfig {
    pub fn new(url: &str, total_requests: usize, concurrency: usize) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let parsed = url::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(url.to_string()));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        let target: Uri = parsed
            .as_str()
            .parse()
            .map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;

        if total_requests == 0 {
            return Err(ConfigError::InvalidRequests);
        }
        if concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        Ok(Self {
            target,
            total_requests,
            concurrency,
        })
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> &Uri {
        &self.target
    }

    #[inline]
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    #[inline]
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
