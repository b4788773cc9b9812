/// Environment variable naming the classifier backend base URL.
pub const API_URL_ENV: &str = "TEMAN_ISYARAT_API_URL";

/// Default backend address for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// The one piece of external configuration: where the classifier lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = BackendConfig::new("http://10.0.0.5:8000/");
        assert_eq!(config.base_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn default_points_at_localhost() {
        assert_eq!(BackendConfig::default().base_url, DEFAULT_BASE_URL);
    }
}
