//! Transport option storage for curlkit

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP method enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        };
        write!(f, "{}", method)
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(()),
        }
    }
}

/// Hostname verification mode.
///
/// cURL historically accepted both booleans and integers here; `0` disables
/// the check and any other value enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyHost {
    Off,
    On,
}

impl From<bool> for VerifyHost {
    fn from(value: bool) -> Self {
        if value {
            VerifyHost::On
        } else {
            VerifyHost::Off
        }
    }
}

impl From<i32> for VerifyHost {
    fn from(value: i32) -> Self {
        VerifyHost::from(value != 0)
    }
}

/// Proxy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// SSL/TLS configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslConfig {
    pub verify_peer: bool,
    pub verify_host: VerifyHost,
}

impl Default for SslConfig {
    fn default() -> Self {
        SslConfig {
            verify_peer: true,
            verify_host: VerifyHost::On,
        }
    }
}

/// Options held by a transport between requests.
///
/// `Default` mirrors a freshly reset cURL handle: no timeouts, no proxy,
/// certificate checks on, redirects off.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOptions {
    pub url: Option<String>,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub follow_location: bool,
    pub max_redirects: Option<u32>,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub proxy: Option<ProxyConfig>,
    pub ssl: SslConfig,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            url: None,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            cookie: None,
            user_agent: Some(crate::USER_AGENT.to_string()),
            follow_location: false,
            max_redirects: None,
            timeout: None,
            connect_timeout: None,
            proxy: None,
            ssl: SslConfig::default(),
        }
    }
}

impl TransportOptions {
    /// Look up a header value by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
