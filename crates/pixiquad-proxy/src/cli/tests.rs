#![allow(clippy::expect_used)]

use crate::cli::Args;
use clap::Parser;
use std::{net::SocketAddr, str::FromStr};
use url::Url;

pub fn fake_args(upstream_url: &str) -> Args {
    Args {
        listen_address: SocketAddr::from_str("127.0.0.1:0")
            .expect("Failed to construct fake listen address."),
        api_key: String::from("test-api-key"),
        upstream_url: Url::from_str(upstream_url).expect("Failed to construct fake upstream URL."),
        timeout_secs: 5,
        allowed_origins: vec!["http://localhost:8080".parse().expect("Bad fake origin.")],
    }
}

#[test]
fn test_defaults() {
    let args = Args::try_parse_from(["pixiquad-proxy", "--api-key", "k"]).expect("Failed to parse.");

    assert_eq!(args.listen_address, SocketAddr::from(([0, 0, 0, 0], 8787)));
    assert_eq!(args.upstream_url.as_str(), "https://api.remove.bg/v1.0/removebg");
    assert_eq!(args.timeout_secs, 60);
    assert_eq!(args.allowed_origins, ["http://localhost:8080"]);
}

#[test]
fn test_repeated_origins() {
    let args = Args::try_parse_from([
        "pixiquad-proxy",
        "--api-key",
        "k",
        "--allowed-origin",
        "https://pixiquad.example",
        "--allowed-origin",
        "http://127.0.0.1:8080",
    ])
    .expect("Failed to parse.");

    assert_eq!(
        args.allowed_origins,
        ["https://pixiquad.example", "http://127.0.0.1:8080"]
    );
}

#[test]
fn test_debug_hides_api_key() {
    let args = fake_args("http://127.0.0.1:1/removebg");

    let printed = format!("{args:?}");

    assert!(!printed.contains("test-api-key"));
    assert!(printed.contains("<redacted>"));
}

#[test]
fn test_defaults_match_client_endpoint() {
    let args = Args::try_parse_from(["pixiquad-proxy", "--api-key", "k"]).expect("Failed to parse.");
    let endpoint =
        Url::parse(pixiquad_media::removal::DEFAULT_ENDPOINT).expect("Bad default endpoint.");

    assert_eq!(endpoint.port(), Some(args.listen_address.port()));
    assert_eq!(endpoint.path(), "/api/removebg");

    let origin = args.allowed_origins[0]
        .to_str()
        .expect("Bad default origin.");
    let origin = Url::parse(origin).expect("Bad default origin.");
    assert_eq!(endpoint.host_str(), origin.host_str());
}
