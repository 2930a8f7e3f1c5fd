/// Path every backend endpoint lives under
pub const API_PATH_SUFFIX: &str = "/api/chatbot";

/// Hosted backend used when nothing overrides it
pub const DEFAULT_API_BASE_URL: &str = "https://jewelry-api.onrender.com/api/chatbot";

/// Build-time override, the counterpart of the storefront's env-based setting
const BUILD_TIME_BASE_URL: Option<&str> = option_env!("JEWELCHAT_API_BASE_URL");

/// Normalize a base URL so it always ends with [`API_PATH_SUFFIX`]
pub fn normalize_api_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');

    if trimmed.ends_with(API_PATH_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, API_PATH_SUFFIX)
    }
}

/// Client configuration, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_api_base_url(base_url.as_ref()),
        }
    }

    /// Pick the base URL: explicit override, then the build-time variable, then the default
    pub fn resolve(override_url: Option<&str>) -> Self {
        let chosen = [override_url, BUILD_TIME_BASE_URL]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);

        Self::new(chosen)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::resolve(None)
    }
}
