//! Transport seam and the reqwest-backed implementation
//!
//! A transport stores named options between requests, applies request
//! headers, can be reset to defaults and executes whatever is configured.
//! Everything above this module only shapes options; network I/O, TLS,
//! redirects and proxies are handled here by reqwest.

use std::future::Future;
use std::time::Duration;

use crate::config::{HttpMethod, ProxyConfig, TransportOptions, VerifyHost};
use crate::error::{CurlError, Result};
use crate::http::response::Response;
use crate::utils::UrlUtils;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use reqwest::{Client, ClientBuilder, Method};

/// A single named transport option
#[derive(Debug, Clone, PartialEq)]
pub enum CurlOption {
    Url(String),
    CustomRequest(HttpMethod),
    /// Switch back to a body-less GET
    HttpGet,
    PostFields(Vec<u8>),
    /// Zero waits forever
    ConnectTimeout(Duration),
    /// Zero waits forever
    Timeout(Duration),
    SslVerifyPeer(bool),
    SslVerifyHost(VerifyHost),
    Proxy(String),
    ProxyUserPwd { username: String, password: String },
    FollowLocation(bool),
    MaxRedirs(u32),
    Cookie(String),
    UserAgent(String),
}

impl TransportOptions {
    /// Store one option, replacing any previous value
    pub fn apply(&mut self, option: CurlOption) {
        match option {
            CurlOption::Url(url) => self.url = Some(url),
            CurlOption::CustomRequest(method) => self.method = method,
            CurlOption::HttpGet => {
                self.method = HttpMethod::Get;
                self.body = None;
            }
            CurlOption::PostFields(body) => self.body = Some(body),
            CurlOption::ConnectTimeout(timeout) => {
                self.connect_timeout = Some(timeout).filter(|t| !t.is_zero())
            }
            CurlOption::Timeout(timeout) => self.timeout = Some(timeout).filter(|t| !t.is_zero()),
            CurlOption::SslVerifyPeer(verify) => self.ssl.verify_peer = verify,
            CurlOption::SslVerifyHost(verify) => self.ssl.verify_host = verify,
            CurlOption::Proxy(url) => {
                let (username, password) = match self.proxy.take() {
                    Some(previous) => (previous.username, previous.password),
                    None => (None, None),
                };
                self.proxy = Some(ProxyConfig {
                    url,
                    username,
                    password,
                });
            }
            CurlOption::ProxyUserPwd { username, password } => match self.proxy.as_mut() {
                Some(proxy) => {
                    proxy.username = Some(username);
                    proxy.password = Some(password);
                }
                None => log::warn!("Ignoring proxy credentials: no proxy configured"),
            },
            CurlOption::FollowLocation(follow) => self.follow_location = follow,
            CurlOption::MaxRedirs(max) => self.max_redirects = Some(max),
            CurlOption::Cookie(cookie) => self.cookie = Some(cookie),
            CurlOption::UserAgent(user_agent) => self.user_agent = Some(user_agent),
        }
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn unset_header(&mut self, name: &str) {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }
}

/// The HTTP execution engine configured by [`crate::http::Curl`]
pub trait Transport {
    fn options(&self) -> &TransportOptions;

    fn options_mut(&mut self) -> &mut TransportOptions;

    /// Execute the configured request and read the whole response
    fn execute(&mut self) -> impl Future<Output = Result<Response>> + Send;

    fn set_option(&mut self, option: CurlOption) {
        self.options_mut().apply(option);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.options_mut().set_header(name, value);
    }

    fn unset_header(&mut self, name: &str) {
        self.options_mut().unset_header(name);
    }

    /// Restore every option to its default
    fn reset(&mut self) {
        *self.options_mut() = TransportOptions::default();
    }
}

/// Transport that sends requests with reqwest
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    options: TransportOptions,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn options(&self) -> &TransportOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut TransportOptions {
        &mut self.options
    }

    async fn execute(&mut self) -> Result<Response> {
        let options = &self.options;
        let url = options
            .url
            .as_deref()
            .ok_or_else(|| CurlError::InvalidUrl("No URL configured".to_string()))?;
        let url = UrlUtils::validate_url(url)?;

        let client = build_client(options)?;
        let method = to_reqwest_method(options.method);
        log::debug!("{} {}", method, url);

        let mut request = client
            .request(method, url)
            .headers(build_headers(options)?);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(CurlError::Http)?;
        log::debug!("Response status: {}", response.status());
        Response::read(response).await
    }
}

/// Create a reqwest client honouring the stored options
fn build_client(options: &TransportOptions) -> Result<Client> {
    let mut builder = ClientBuilder::new().redirect(if options.follow_location {
        match options.max_redirects {
            Some(max) => reqwest::redirect::Policy::limited(max as usize),
            None => reqwest::redirect::Policy::default(),
        }
    } else {
        reqwest::redirect::Policy::none()
    });

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    // Configure proxy if specified
    if let Some(proxy_config) = &options.proxy {
        let proxy_url = if proxy_config.url.contains("://") {
            proxy_config.url.clone()
        } else {
            format!("http://{}", proxy_config.url)
        };
        let proxy = reqwest::Proxy::all(&proxy_url)
            .map_err(|e| CurlError::Proxy(format!("Invalid proxy: {}", e)))?;

        let proxy = if let (Some(username), Some(password)) =
            (&proxy_config.username, &proxy_config.password)
        {
            proxy.basic_auth(username, password)
        } else {
            proxy
        };

        builder = builder.proxy(proxy);
    }

    // Configure SSL/TLS
    if !options.ssl.verify_peer {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if options.ssl.verify_host == VerifyHost::Off {
        builder = builder.danger_accept_invalid_hostnames(true);
    }

    builder.build().map_err(CurlError::Http)
}

fn build_headers(options: &TransportOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(user_agent) = &options.user_agent {
        headers.insert(USER_AGENT, header_value(user_agent)?);
    }

    for (name, value) in &options.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CurlError::InvalidHeader(format!("{}: {}", name, e)))?;
        headers.insert(header_name, header_value(value)?);
    }

    if let Some(cookie) = &options.cookie {
        headers.insert(COOKIE, header_value(cookie)?);
    }

    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| CurlError::InvalidHeader(format!("{}: {}", value, e)))
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Trace => Method::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_client, build_headers, CurlOption};
    use crate::config::{HttpMethod, TransportOptions, VerifyHost};
    use crate::error::CurlError;
    use std::time::Duration;

    #[test]
    fn zero_timeouts_mean_unlimited() {
        let mut options = TransportOptions::default();
        options.apply(CurlOption::Timeout(Duration::from_secs(5)));
        options.apply(CurlOption::ConnectTimeout(Duration::ZERO));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.connect_timeout, None);
        options.apply(CurlOption::Timeout(Duration::ZERO));
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn http_get_clears_body() {
        let mut options = TransportOptions::default();
        options.apply(CurlOption::CustomRequest(HttpMethod::Post));
        options.apply(CurlOption::PostFields(b"a=1".to_vec()));
        options.apply(CurlOption::HttpGet);
        assert_eq!(options.method, HttpMethod::Get);
        assert_eq!(options.body, None);
    }

    #[test]
    fn proxy_credentials_need_a_proxy() {
        let mut options = TransportOptions::default();
        options.apply(CurlOption::ProxyUserPwd {
            username: "u".to_string(),
            password: "p".to_string(),
        });
        assert_eq!(options.proxy, None);

        options.apply(CurlOption::Proxy("127.0.0.1:8080".to_string()));
        options.apply(CurlOption::ProxyUserPwd {
            username: "u".to_string(),
            password: "p".to_string(),
        });
        let proxy = options.proxy.clone().expect("proxy");
        assert_eq!(proxy.url, "127.0.0.1:8080");
        assert_eq!(proxy.username.as_deref(), Some("u"));

        options.apply(CurlOption::Proxy("10.0.0.1:3128".to_string()));
        let proxy = options.proxy.expect("proxy");
        assert_eq!(proxy.url, "10.0.0.1:3128");
        assert_eq!(proxy.password.as_deref(), Some("p"));
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut options = TransportOptions::default();
        options.set_header("X-Token", "a");
        options.set_header("x-token", "b");
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.header("X-TOKEN"), Some("b"));
        options.unset_header("X-Token");
        assert!(options.headers.is_empty());
    }

    #[test]
    fn cookie_option_overrides_cookie_header() {
        let mut options = TransportOptions::default();
        options.set_header("Cookie", "stale=1");
        options.apply(CurlOption::Cookie("fresh=2".to_string()));
        let headers = build_headers(&options).expect("headers");
        assert_eq!(headers.get("cookie").expect("cookie"), "fresh=2");
        assert!(headers.get("user-agent").is_some());
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let mut options = TransportOptions::default();
        options.set_header("bad header", "x");
        let err = build_headers(&options).expect_err("invalid name");
        assert!(matches!(err, CurlError::InvalidHeader(_)));
    }

    #[test]
    fn client_builds_with_relaxed_tls_and_proxy() {
        let mut options = TransportOptions::default();
        options.apply(CurlOption::SslVerifyPeer(false));
        options.apply(CurlOption::SslVerifyHost(VerifyHost::Off));
        options.apply(CurlOption::Proxy("127.0.0.1:8080".to_string()));
        options.apply(CurlOption::FollowLocation(true));
        options.apply(CurlOption::MaxRedirs(2));
        build_client(&options).expect("client should build");
    }
}
