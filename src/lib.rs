//! curlkit - convenience HTTP client with in-memory multipart uploads
//!
//! This crate wraps a reqwest-backed transport with the helpers most
//! scraping and API-integration code ends up writing by hand: common
//! timeout, TLS, proxy and redirect settings, a cookie jar rendered into a
//! single `Cookie` header, and multipart/form-data uploads whose file parts
//! come from memory rather than disk.
//!
//! ```no_run
//! use curlkit::Curl;
//!
//! # async fn example() -> curlkit::Result<()> {
//! let mut curl = Curl::new();
//! curl.set_common(10, 30)
//!     .set_cookie("session", "abc")
//!     .add_file("avatar", "me.png", vec![0x89u8, 0x50], Some("image/png"));
//! curl.upload("https://example.com/profile", &[("nickname", "me")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod http;
pub mod logging;
pub mod utils;

pub use error::{CurlError, Result};
pub use http::Curl;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent unless overridden
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";
