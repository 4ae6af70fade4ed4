use clap::Parser;
use healthcheck::{config::RunConfig, run, CheckError, ConfigError};

use crate::common::server::{closed_port, spawn_server};

fn config(args: &[&str]) -> RunConfig {
    RunConfig::try_parse_from(std::iter::once("./healthcheck").chain(args.iter().copied()))
        .expect("Could not parse")
}

#[tokio::test]
async fn test_matching_status_succeeds() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/status/200");
    run(config(&["--url", &url])).await.expect("Health check failed");
}

#[tokio::test]
async fn test_hostname_and_endpoint_are_combined() {
    let addr = spawn_server().await;
    let port = addr.port().to_string();
    run(config(&[
        "-N",
        "127.0.0.1",
        "-P",
        &port,
        "-E",
        "/status/204",
        "-C",
        "204",
    ]))
    .await
    .expect("Health check failed");
}

#[tokio::test]
async fn test_status_mismatch() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/status/503");
    let err = run(config(&["-U", &url])).await.unwrap_err();

    assert!(matches!(
        err,
        CheckError::StatusMismatch {
            actual: 503,
            expected: 200
        }
    ));
    assert_eq!(err.to_string(), "resp code 503 didn't match 200");
}

#[tokio::test]
async fn test_expected_non_success_status() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/status/503");
    run(config(&["-U", &url, "--code", "503"]))
        .await
        .expect("Health check failed");
}

#[tokio::test]
async fn test_headers_are_sent() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/require-headers");
    run(config(&[
        "-U",
        &url,
        "-H",
        "X-Test:abc",
        "-H",
        "X-Test:def",
        "-H",
        "Authorization:Bearer abc:def",
    ]))
    .await
    .expect("Health check failed");

    let err = run(config(&["-U", &url, "-H", "X-Test:abc"]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "resp code 400 didn't match 200");
}

#[tokio::test]
async fn test_verb_is_used() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/submit");
    run(config(&["-U", &url, "-V", "POST", "-C", "201"]))
        .await
        .expect("Health check failed");

    let err = run(config(&["-U", &url, "-C", "201"])).await.unwrap_err();
    assert_eq!(err.to_string(), "resp code 405 didn't match 201");
}

#[tokio::test]
async fn test_malformed_header_aborts_before_request() {
    let addr = spawn_server().await;
    let url = format!("http://{addr}/status/200");
    let err = run(config(&["-U", &url, "-H", "X-Test"])).await.unwrap_err();

    assert!(matches!(
        err,
        CheckError::Config {
            source: ConfigError::MalformedHeader { .. }
        }
    ));
    assert!(err.is_pre_flight());
}

#[tokio::test]
async fn test_unreachable_host() {
    let url = format!("http://127.0.0.1:{}/", closed_port());
    let err = run(config(&["-U", &url])).await.unwrap_err();
    assert!(matches!(err, CheckError::Transport { .. }));
}

#[tokio::test]
async fn test_validation_failures_never_reach_network() {
    // the closed port would produce a transport error if anything were sent
    let port = closed_port().to_string();
    let url = format!("http://127.0.0.1:{port}/");

    let cases: [(Vec<&str>, ConfigError); 3] = [
        (vec![], ConfigError::MissingTarget),
        (
            vec!["-U", &url, "-N", "127.0.0.1"],
            ConfigError::ConflictingTarget,
        ),
        (
            vec!["-N", "127.0.0.1", "-P", "0"],
            ConfigError::InvalidPort { port: 0 },
        ),
    ];
    for (args, expected) in cases {
        match run(config(&args)).await {
            Err(CheckError::Config { source }) => assert_eq!(source, expected),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
