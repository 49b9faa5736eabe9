use curlkit::utils::UrlUtils;

#[test]
fn test_version() {
    assert!(!curlkit::VERSION.is_empty());
}

#[test]
fn test_default_user_agent_is_browser_like() {
    assert!(curlkit::USER_AGENT.starts_with("Mozilla/5.0"));
}

#[test]
fn test_url_utils_adds_scheme() {
    let url = UrlUtils::validate_url("example.com").expect("URL should parse");
    assert_eq!(url.scheme(), "http");
}
