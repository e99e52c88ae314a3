#![allow(clippy::expect_used)]

use crate::cli::tests::fake_args;
use crate::http::router;
use crate::app_context;
use axum_test::TestServer;

pub fn test_server(upstream_url: &str) -> TestServer {
    let args = fake_args(upstream_url);
    let app_context = app_context::init(&args).expect("Failed to build app context.");
    let router = router::new(&args, app_context);
    TestServer::new(router).expect("Failed to run test server.")
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let server = test_server("http://127.0.0.1:1/removebg");

    let response = server
        .method(http::Method::OPTIONS, "/api/removebg")
        .add_header("Origin", "http://localhost:8080")
        .add_header("Access-Control-Request-Method", "POST")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("access-control-allow-origin"),
        "http://localhost:8080"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let server = test_server("http://127.0.0.1:1/removebg");

    let response = server.get("/api/nothing-here").expect_failure().await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_default_client_endpoint_is_routed() {
    let server = test_server("http://127.0.0.1:1/removebg");
    let endpoint = url::Url::parse(pixiquad_media::removal::DEFAULT_ENDPOINT)
        .expect("Bad default endpoint.");

    let response = server
        .method(http::Method::OPTIONS, endpoint.path())
        .add_header("Origin", "http://localhost:8080")
        .add_header("Access-Control-Request-Method", "POST")
        .await;

    response.assert_status_ok();
}
