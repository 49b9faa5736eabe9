//! Utility functions and helpers

use crate::error::{CurlError, Result};
use url::Url;

/// URL validation and parsing utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate and normalize URL
    pub fn validate_url(input: &str) -> Result<Url> {
        // Add http:// if no scheme is provided
        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        Url::parse(&url_str)
            .map_err(|e| CurlError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))
    }

    /// Append query pairs to a URL, keeping any query it already has
    pub fn with_query(input: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Self::validate_url(input)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Encode pairs as an `application/x-www-form-urlencoded` body
    pub fn form_encode(data: &[(&str, &str)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(data)
            .finish()
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Parse `key: value` header lines
    pub fn parse_header(input: &str) -> Result<(String, String)> {
        match input.split_once(':') {
            Some((key, value)) => Ok((key.trim().to_string(), value.trim().to_string())),
            None => Err(CurlError::Config(format!(
                "Invalid header format: '{}'. Expected 'key: value'",
                input
            ))),
        }
    }

    /// Parse `name=value` pairs used for form fields and cookies
    pub fn parse_pair(input: &str) -> Result<(String, String)> {
        match input.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => Err(CurlError::Config(format!(
                "Invalid pair format: '{}'. Expected 'name=value'",
                input
            ))),
        }
    }

    /// Parse a whole number of seconds
    pub fn parse_seconds(input: &str) -> Result<u64> {
        input
            .trim()
            .parse()
            .map_err(|_| CurlError::Config(format!("Invalid number of seconds: '{}'", input)))
    }
}
