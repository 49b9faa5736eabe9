//! CLI argument parsing module
//!
//! This module handles command-line argument parsing and application entry point.

use std::io::{self, Write};

use crate::error::{CurlError, Result};
use crate::exit_code::exit_code_for_error;
use crate::http::auth::Auth;
use crate::http::{Curl, Response, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use crate::utils::{StringUtils, UrlUtils};
use clap::{Arg, ArgAction, ArgMatches, Command};

/// An in-memory part given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartArg {
    pub name: String,
    pub filename: String,
    pub content: String,
    pub mime_type: Option<String>,
}

/// How the request is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Get,
    Post,
    Upload,
}

/// Everything parsed from the command line
#[derive(Debug, Clone)]
pub struct CliRequest {
    pub url: String,
    pub mode: Mode,
    pub fields: Vec<(String, String)>,
    pub parts: Vec<PartArg>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub cookie_header: Option<String>,
    pub proxy: Option<String>,
    pub proxy_user: Option<String>,
    pub user: Option<(String, String)>,
    pub insecure: bool,
    pub max_redirects: Option<i64>,
    pub connect_timeout: u64,
    pub timeout: u64,
    pub user_agent: Option<String>,
    pub include: bool,
}

/// Main entry point for the CLI application
pub fn run() {
    let matches = create_app().get_matches();
    crate::logging::init(matches.get_flag("verbose"));

    if let Err(e) = run_with_args(&matches) {
        eprintln!("curlkit: error: {}", e);
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run_with_args(matches: &ArgMatches) -> Result<()> {
    let request = build_request_from_args(matches)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CurlError::Config(format!("Failed to create async runtime: {}", e)))?;

    rt.block_on(async {
        let mut curl = Curl::new();
        apply_request(&mut curl, &request);

        let fields: Vec<(&str, &str)> = request
            .fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        match request.mode {
            Mode::Upload => curl.upload(&request.url, &fields).await?,
            Mode::Post => curl.post(&request.url, &fields).await?,
            Mode::Get => curl.get(&request.url, &[]).await?,
        };

        if let Some(response) = curl.response() {
            write_response(response, request.include)?;
        }
        Ok::<(), CurlError>(())
    })
}

/// Configure a client from parsed arguments
pub fn apply_request(curl: &mut Curl, request: &CliRequest) {
    curl.set_common(request.connect_timeout, request.timeout)
        .set_headers(request.headers.iter().map(|(k, v)| (k, v)));

    if request.insecure {
        curl.set_ssl_verify(false, false);
    }
    if let Some(max) = request.max_redirects {
        curl.set_follow_location(max);
    }
    if let Some(proxy) = &request.proxy {
        curl.set_proxy(proxy, request.proxy_user.as_deref().unwrap_or(""));
    }
    if let Some((username, password)) = &request.user {
        curl.set_basic_authentication(username, password);
    }
    if let Some(user_agent) = &request.user_agent {
        curl.set_user_agent(user_agent);
    }
    if let Some(raw) = &request.cookie_header {
        curl.set_cookie_header(raw);
    }
    if !request.cookies.is_empty() {
        curl.set_cookies(request.cookies.iter().map(|(k, v)| (k, v)));
    }
    for part in &request.parts {
        curl.add_file(
            &part.name,
            &part.filename,
            part.content.as_bytes(),
            part.mime_type.as_deref(),
        );
    }
}

fn write_response(response: &Response, include: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if include {
        writeln!(stdout, "{:?} {}", response.version, response.status)?;
        for (name, value) in &response.headers {
            writeln!(stdout, "{}: {}", name, value.to_str().unwrap_or("<non-utf8>"))?;
        }
        writeln!(stdout)?;
    }
    stdout.write_all(response.text().as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Create the CLI application structure
pub fn create_app() -> Command {
    Command::new("curlkit")
        .version(crate::VERSION)
        .about("HTTP client with cookie jar and in-memory multipart uploads")
        .arg(Arg::new("url")
            .help("The URL to request")
            .required(true)
            .index(1))
        .arg(Arg::new("form")
            .short('F')
            .long("form")
            .value_name("NAME=VALUE")
            .help("Add a multipart form field")
            .action(ArgAction::Append))
        .arg(Arg::new("part")
            .long("part")
            .value_name("NAME=FILENAME:CONTENT")
            .help("Add an in-memory file part to a multipart upload")
            .action(ArgAction::Append))
        .arg(Arg::new("type")
            .long("type")
            .value_name("NAME=MIME")
            .help("MIME type for the part called NAME")
            .action(ArgAction::Append))
        .arg(Arg::new("data")
            .short('d')
            .long("data")
            .value_name("NAME=VALUE")
            .help("Add a form-urlencoded POST field")
            .action(ArgAction::Append)
            .conflicts_with_all(["form", "part"]))
        .arg(Arg::new("header")
            .short('H')
            .long("header")
            .value_name("HEADER")
            .help("Add custom HTTP header")
            .action(ArgAction::Append))
        .arg(Arg::new("cookie")
            .short('b')
            .long("cookie")
            .value_name("NAME=VALUE")
            .help("Add a cookie to the jar")
            .action(ArgAction::Append))
        .arg(Arg::new("cookie-header")
            .long("cookie-header")
            .value_name("RAW")
            .help("Send a raw Cookie header"))
        .arg(Arg::new("proxy")
            .short('x')
            .long("proxy")
            .value_name("HOST:PORT")
            .help("Use proxy server"))
        .arg(Arg::new("proxy-user")
            .short('U')
            .long("proxy-user")
            .value_name("USER:PASSWORD")
            .help("Proxy credentials"))
        .arg(Arg::new("user")
            .short('u')
            .long("user")
            .value_name("USER[:PASSWORD]")
            .help("HTTP basic authentication"))
        .arg(Arg::new("insecure")
            .short('k')
            .long("insecure")
            .help("Skip certificate and hostname verification")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("location")
            .short('L')
            .long("location")
            .value_name("MAX")
            .help("Follow redirects, at most MAX times")
            .num_args(0..=1)
            .default_missing_value("2")
            .allow_negative_numbers(true))
        .arg(Arg::new("timeout")
            .long("timeout")
            .value_name("SECONDS")
            .help("Maximum time for the whole operation, 0 for none")
            .default_value("10"))
        .arg(Arg::new("connect-timeout")
            .long("connect-timeout")
            .value_name("SECONDS")
            .help("Maximum time for connection, 0 for none")
            .default_value("10"))
        .arg(Arg::new("user-agent")
            .short('A')
            .long("user-agent")
            .value_name("STRING")
            .help("User-Agent header"))
        .arg(Arg::new("include")
            .short('i')
            .long("include")
            .help("Include response status and headers in the output")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Verbose logging")
            .action(ArgAction::SetTrue))
}

/// Build a request description from command line arguments
pub fn build_request_from_args(matches: &ArgMatches) -> Result<CliRequest> {
    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| CurlError::Config("Missing URL".to_string()))?;
    let url = UrlUtils::validate_url(url)?.to_string();

    let fields = many(matches, "form")
        .chain(many(matches, "data"))
        .map(StringUtils::parse_pair)
        .collect::<Result<Vec<_>>>()?;

    let types = many(matches, "type")
        .map(StringUtils::parse_pair)
        .collect::<Result<Vec<_>>>()?;
    let parts = many(matches, "part")
        .map(|input| parse_part(input, &types))
        .collect::<Result<Vec<_>>>()?;

    let mode = if !parts.is_empty() || matches.contains_id("form") {
        Mode::Upload
    } else if matches.contains_id("data") {
        Mode::Post
    } else {
        Mode::Get
    };

    let headers = many(matches, "header")
        .map(StringUtils::parse_header)
        .collect::<Result<Vec<_>>>()?;
    let cookies = many(matches, "cookie")
        .map(StringUtils::parse_pair)
        .collect::<Result<Vec<_>>>()?;

    let user = matches
        .get_one::<String>("user")
        .map(|input| Auth::parse_user_pass(input))
        .transpose()?;

    let max_redirects = matches
        .get_one::<String>("location")
        .map(|max| {
            max.parse::<i64>()
                .map_err(|_| CurlError::Config(format!("Invalid redirect limit: '{}'", max)))
        })
        .transpose()?;

    let timeout = match matches.get_one::<String>("timeout") {
        Some(value) => StringUtils::parse_seconds(value)?,
        None => DEFAULT_TIMEOUT,
    };
    let connect_timeout = match matches.get_one::<String>("connect-timeout") {
        Some(value) => StringUtils::parse_seconds(value)?,
        None => DEFAULT_CONNECT_TIMEOUT,
    };

    Ok(CliRequest {
        url,
        mode,
        fields,
        parts,
        headers,
        cookies,
        cookie_header: matches.get_one::<String>("cookie-header").cloned(),
        proxy: matches.get_one::<String>("proxy").cloned(),
        proxy_user: matches.get_one::<String>("proxy-user").cloned(),
        user,
        insecure: matches.get_flag("insecure"),
        max_redirects,
        connect_timeout,
        timeout,
        user_agent: matches.get_one::<String>("user-agent").cloned(),
        include: matches.get_flag("include"),
    })
}

fn many<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a str> {
    matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(String::as_str)
}

/// Parse `NAME=FILENAME:CONTENT`, looking up a MIME type declared for NAME
fn parse_part(input: &str, types: &[(String, String)]) -> Result<PartArg> {
    let (name, rest) = StringUtils::parse_pair(input)?;
    let (filename, content) = rest.split_once(':').ok_or_else(|| {
        CurlError::Config(format!(
            "Invalid part format: '{}'. Expected 'NAME=FILENAME:CONTENT'",
            input
        ))
    })?;
    let mime_type = types
        .iter()
        .find(|(part, _)| *part == name)
        .map(|(_, mime)| mime.clone());

    Ok(PartArg {
        filename: filename.to_string(),
        content: content.to_string(),
        name,
        mime_type,
    })
}
