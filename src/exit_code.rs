use crate::error::CurlError;

/// Map an error to the exit code curl uses for the same failure
pub fn exit_code_for_error(err: &CurlError) -> i32 {
    match err {
        CurlError::InvalidUrl(_) => 3,
        CurlError::Config(_) | CurlError::InvalidHeader(_) => 2,
        CurlError::Proxy(_) => 5,
        CurlError::Auth(_) => 94,
        CurlError::Io(_) => 23,
        CurlError::Json(_) => 26,
        CurlError::Http(err) => http_exit_code(err),
    }
}

fn http_exit_code(err: &reqwest::Error) -> i32 {
    if err.is_timeout() {
        return 28;
    }
    if err.is_redirect() {
        return 47;
    }
    if err.is_connect() {
        return 7;
    }
    if err.is_builder() {
        return 2;
    }
    56
}
