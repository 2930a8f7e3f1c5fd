#[cfg(test)]
mod config_tests {
    use crate::config::{normalize_api_base_url, ApiConfig, DEFAULT_API_BASE_URL};
    use crate::{ApiError, HttpChatClient};

    #[test]
    fn test_normalize_appends_suffix() {
        assert_eq!(
            normalize_api_base_url("http://localhost:5000"),
            "http://localhost:5000/api/chatbot"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_suffix() {
        assert_eq!(
            normalize_api_base_url("https://jewelry-api.onrender.com/api/chatbot"),
            "https://jewelry-api.onrender.com/api/chatbot"
        );
    }

    #[test]
    fn test_normalize_trims_trailing_slashes() {
        assert_eq!(
            normalize_api_base_url("http://localhost:5000/"),
            "http://localhost:5000/api/chatbot"
        );
        assert_eq!(
            normalize_api_base_url(" http://localhost:5000/api/chatbot/ "),
            "http://localhost:5000/api/chatbot"
        );
    }

    #[test]
    fn test_default_url_is_already_normalized() {
        assert_eq!(normalize_api_base_url(DEFAULT_API_BASE_URL), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_resolve_prefers_override() {
        let config = ApiConfig::resolve(Some("http://127.0.0.1:8080"));
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/chatbot");
    }

    #[test]
    fn test_resolve_ignores_blank_override() {
        assert_eq!(ApiConfig::resolve(Some("   ")), ApiConfig::resolve(None));
    }

    #[test]
    fn test_client_rejects_unparseable_base() {
        let err = HttpChatClient::new(ApiConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
