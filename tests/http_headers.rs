use curlkit::Curl;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_custom_headers_sent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/headers"))
        .and(header("X-Test-Header", "curlkit"))
        .and(header("X-Other", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut curl = Curl::new();
    curl.set_headers([("X-Test-Header", "curlkit"), ("X-Other", "2")]);
    curl.get(&format!("{}/headers", server.uri()), &[])
        .await
        .expect("request should succeed");
    assert_eq!(curl.response().expect("response").status(), 200);

    let requests = server.received_requests().await.expect("requests");
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok());
    assert_eq!(user_agent, Some(curlkit::USER_AGENT));
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_basic_auth_and_user_agent() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(header("user-agent", "curlkit-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut curl = Curl::new();
    curl.set_basic_authentication("user", "pass")
        .set_user_agent("curlkit-test");
    curl.get(&format!("{}/auth", server.uri()), &[])
        .await
        .expect("request should succeed");
    assert_eq!(curl.response().expect("response").status(), 200);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_raw_cookie_header_sent_verbatim() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cookies"))
        .and(header("cookie", "sid=a%20b; theme=dark"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut curl = Curl::new();
    curl.set_cookie_header("sid=a%20b; theme=dark");
    curl.get(&format!("{}/cookies", server.uri()), &[])
        .await
        .expect("request should succeed");
    assert_eq!(curl.response().expect("response").status(), 200);
}

#[cfg_attr(miri, ignore)]
#[tokio::test]
async fn test_shared_instance_reset_drops_cookies() {
    if !can_bind_localhost() {
        return;
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let url = format!("{}/session", server.uri());

    {
        let mut curl = Curl::instance(true).await;
        curl.set_cookie("sid", "1");
        curl.get(&url, &[]).await.expect("first request");
    }
    {
        let mut curl = Curl::instance(false).await;
        curl.get(&url, &[]).await.expect("second request");
    }
    {
        let mut curl = Curl::instance(true).await;
        curl.get(&url, &[]).await.expect("third request");
    }

    let requests = server.received_requests().await.expect("requests");
    let cookies: Vec<Option<&str>> = requests
        .iter()
        .map(|req| req.headers.get("cookie").and_then(|v| v.to_str().ok()))
        .collect();
    assert_eq!(cookies, vec![Some("sid=1"), Some("sid=1"), None]);
}
