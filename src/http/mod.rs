//! HTTP client module
//!
//! [`Curl`] wraps a [`Transport`] and layers on the conveniences missing from
//! a bare option store: common timeout, TLS, proxy and redirect helpers, a
//! cookie jar rendered into one `Cookie` header, and multipart uploads of
//! in-memory payloads.

use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};

use crate::config::{HttpMethod, TransportOptions, VerifyHost};
use crate::error::Result;
use crate::utils::UrlUtils;

pub mod auth;
pub mod cookie;
pub mod multipart;
pub mod response;
pub mod transport;

pub use cookie::CookieJar;
pub use multipart::{MultipartBody, UploadPart};
pub use response::Response;
pub use transport::{CurlOption, ReqwestTransport, Transport};

/// Connect timeout applied by [`Curl::set_common`] callers wanting the usual default
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;
/// Total timeout applied by [`Curl::set_common`] callers wanting the usual default
pub const DEFAULT_TIMEOUT: u64 = 10;
/// Redirect cap commonly passed to [`Curl::set_follow_location`]
pub const DEFAULT_MAX_REDIRECTS: i64 = 2;

static INSTANCE: OnceLock<Mutex<Curl>> = OnceLock::new();

/// HTTP client wrapper
///
/// Not meant to be shared between tasks without the lock handed out by
/// [`Curl::instance`]; create independent clients for concurrent requests.
#[derive(Debug)]
pub struct Curl<T: Transport = ReqwestTransport> {
    transport: T,
    cookies: CookieJar,
    files: Vec<UploadPart>,
    response: Option<Response>,
}

impl Curl {
    /// Create an independent client backed by reqwest
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Process-wide default client, created on first use.
    ///
    /// When `reset` is true an already existing client is reset before it is
    /// returned; pass `false` to keep its options, cookies and pending parts
    /// for a follow-up request.
    pub async fn instance(reset: bool) -> MutexGuard<'static, Curl> {
        let mut created = false;
        let lock = INSTANCE.get_or_init(|| {
            created = true;
            Mutex::new(Curl::new())
        });
        let mut guard = lock.lock().await;
        if reset && !created {
            guard.reset();
        }
        guard
    }
}

impl Default for Curl {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Curl<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            cookies: CookieJar::new(),
            files: Vec::new(),
            response: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn options(&self) -> &TransportOptions {
        self.transport.options()
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Parts queued for the next [`Curl::upload`]
    pub fn pending_parts(&self) -> &[UploadPart] {
        &self.files
    }

    /// Response of the last successful dispatch
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Reset transport options to defaults and drop cookies, pending parts
    /// and the last response
    pub fn reset(&mut self) -> &mut Self {
        self.transport.reset();
        self.cookies.clear();
        self.files.clear();
        self.response = None;
        self
    }

    /// Set an arbitrary transport option
    pub fn set_opt(&mut self, option: CurlOption) -> &mut Self {
        self.transport.set_option(option);
        self
    }

    /// Queue an in-memory payload for the next upload.
    ///
    /// `metadata` is the content itself, not a path. Registering the same
    /// `name` again replaces the earlier part in place.
    pub fn add_file(
        &mut self,
        name: &str,
        filename: &str,
        metadata: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) -> &mut Self {
        let part = UploadPart {
            name: name.to_string(),
            filename: filename.to_string(),
            metadata: metadata.into(),
            mime_type: mime_type.map(str::to_string),
        };
        match self.files.iter_mut().find(|existing| existing.name == name) {
            Some(existing) => *existing = part,
            None => self.files.push(part),
        }
        self
    }

    /// POST queued parts and `data` fields as multipart/form-data.
    ///
    /// Queued parts are consumed before the request is sent, so they are
    /// gone whether or not the request succeeds.
    pub async fn upload(&mut self, url: &str, data: &[(&str, &str)]) -> Result<&mut Self> {
        self.transport
            .set_option(CurlOption::CustomRequest(HttpMethod::Post));
        self.transport.set_option(CurlOption::Url(url.to_string()));

        let files = std::mem::take(&mut self.files);
        let body = MultipartBody::build(&files, data);
        log::debug!(
            "Uploading {} part(s) and {} field(s) to {} ({} bytes)",
            files.len(),
            data.len(),
            url,
            body.len()
        );

        self.transport.set_header("Content-Type", &body.content_type());
        self.transport
            .set_header("Content-Length", &body.len().to_string());
        self.transport
            .set_option(CurlOption::PostFields(body.into_bytes()));

        self.exec().await
    }

    /// GET `url` with `query` appended.
    ///
    /// The body headers left by an earlier [`Curl::upload`] or [`Curl::post`]
    /// are dropped; any other header stays set.
    pub async fn get(&mut self, url: &str, query: &[(&str, &str)]) -> Result<&mut Self> {
        let url = UrlUtils::with_query(url, query)?;
        self.transport.set_option(CurlOption::HttpGet);
        self.transport.set_option(CurlOption::Url(url.to_string()));
        self.transport.unset_header("Content-Length");
        let body_content_type = self.options().header("Content-Type").is_some_and(|ct| {
            ct.starts_with("multipart/form-data")
                || ct.starts_with("application/x-www-form-urlencoded")
        });
        if body_content_type {
            self.transport.unset_header("Content-Type");
        }
        self.exec().await
    }

    /// POST `data` as an `application/x-www-form-urlencoded` body
    pub async fn post(&mut self, url: &str, data: &[(&str, &str)]) -> Result<&mut Self> {
        let body = UrlUtils::form_encode(data);
        self.transport
            .set_option(CurlOption::CustomRequest(HttpMethod::Post));
        self.transport.set_option(CurlOption::Url(url.to_string()));
        self.transport
            .set_header("Content-Type", "application/x-www-form-urlencoded");
        self.transport
            .set_header("Content-Length", &body.len().to_string());
        self.transport
            .set_option(CurlOption::PostFields(body.into_bytes()));
        self.exec().await
    }

    async fn exec(&mut self) -> Result<&mut Self> {
        self.response = None;
        let response = self.transport.execute().await?;
        self.response = Some(response);
        Ok(self)
    }

    /// Connect and total timeouts in seconds; zero waits forever
    pub fn set_common(&mut self, connect_timeout: u64, timeout: u64) -> &mut Self {
        self.transport
            .set_option(CurlOption::ConnectTimeout(Duration::from_secs(connect_timeout)));
        self.transport
            .set_option(CurlOption::Timeout(Duration::from_secs(timeout)));
        self
    }

    /// Toggle peer certificate and hostname verification
    pub fn set_ssl_verify(
        &mut self,
        verify_peer: bool,
        verify_host: impl Into<VerifyHost>,
    ) -> &mut Self {
        self.transport
            .set_option(CurlOption::SslVerifyPeer(verify_peer));
        self.transport
            .set_option(CurlOption::SslVerifyHost(verify_host.into()));
        self
    }

    /// Route requests through `proxy` (`host:port`), optionally
    /// authenticating with a `user:pass` string. Empty inputs are ignored.
    pub fn set_proxy(&mut self, proxy: &str, auth: &str) -> &mut Self {
        if proxy.is_empty() {
            return self;
        }
        self.transport.set_option(CurlOption::Proxy(proxy.to_string()));
        if !auth.is_empty() {
            let (username, password) = auth.split_once(':').unwrap_or((auth, ""));
            self.transport.set_option(CurlOption::ProxyUserPwd {
                username: username.to_string(),
                password: password.to_string(),
            });
        }
        self
    }

    /// Follow `Location` responses up to `max` times; `max <= 0` leaves the
    /// redirect configuration untouched
    pub fn set_follow_location(&mut self, max: i64) -> &mut Self {
        if max <= 0 {
            log::warn!("Ignoring non-positive redirect cap {}", max);
            return self;
        }
        self.transport.set_option(CurlOption::FollowLocation(true));
        self.transport
            .set_option(CurlOption::MaxRedirs(u32::try_from(max).unwrap_or(u32::MAX)));
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.transport.set_header(name, value);
        self
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            self.transport.set_header(name.as_ref(), value.as_ref());
        }
        self
    }

    pub fn unset_header(&mut self, name: &str) -> &mut Self {
        self.transport.unset_header(name);
        self
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> &mut Self {
        self.transport
            .set_option(CurlOption::UserAgent(user_agent.to_string()));
        self
    }

    pub fn set_basic_authentication(&mut self, username: &str, password: &str) -> &mut Self {
        self.transport
            .set_header("Authorization", &auth::Auth::basic_auth(username, password));
        self
    }

    /// Store a cookie and rewrite the `Cookie` header from the whole jar.
    ///
    /// Values are sent verbatim, without percent-encoding.
    pub fn set_cookie(&mut self, key: &str, value: &str) -> &mut Self {
        self.cookies.set(key, value);
        self.transport
            .set_option(CurlOption::Cookie(self.cookies.to_header()));
        self
    }

    /// [`Curl::set_cookie`] for each pair, in iteration order
    pub fn set_cookies<I, K, V>(&mut self, cookies: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in cookies {
            self.set_cookie(key.as_ref(), value.as_ref());
        }
        self
    }

    /// Send `raw` as the `Cookie` header as is.
    ///
    /// The jar is not updated: a later [`Curl::set_cookie`] rebuilds the
    /// header from jar entries only and drops whatever `raw` contained.
    pub fn set_cookie_header(&mut self, raw: &str) -> &mut Self {
        self.transport.set_option(CurlOption::Cookie(raw.to_string()));
        self
    }
}
