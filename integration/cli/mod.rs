use std::process::{Output, Stdio};
use tokio::process::Command;

use crate::common::server::{closed_port, spawn_server};

async fn healthcheck(args: &[&str]) -> Output {
    let healthcheck_bin = env!("CARGO_BIN_EXE_healthcheck");
    Command::new(healthcheck_bin)
        .env_remove("RUST_LOG")
        .args(args)
        .stderr(Stdio::piped())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .expect("failed to spawn")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim_end().to_string()
}

#[tokio::test]
async fn test_healthy_exits_zero_silently() {
    let addr = spawn_server().await;
    let output = healthcheck(&[&format!("--url=http://{addr}/status/200")]).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn test_single_dash_long_flags() {
    let addr = spawn_server().await;
    let output = healthcheck(&[&format!("-url=http://{addr}/status/200")]).await;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let output = healthcheck(&[
        "-hostname",
        "127.0.0.1",
        &format!("-port={}", addr.port()),
        "-endpoint=/status/503",
        "-code",
        "503",
    ])
    .await;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[tokio::test]
async fn test_empty_verb_sends_get() {
    let addr = spawn_server().await;
    let output = healthcheck(&[&format!("--url=http://{addr}/status/200"), "--verb="]).await;
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[tokio::test]
async fn test_mismatch_exits_one_with_message() {
    let addr = spawn_server().await;
    let output = healthcheck(&["-U", &format!("http://{addr}/status/503")]).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "resp code 503 didn't match 200");
}

#[tokio::test]
async fn test_validation_messages() {
    let cases: [(&[&str], &str); 4] = [
        (&[], "url or hostname length must be > 0"),
        (
            &["-U", "http://localhost/", "-N", "localhost"],
            "specify url or hostname, not both",
        ),
        (
            &["-N", "localhost", "--port=-8"],
            "hostname specified but port is invalid",
        ),
        (
            &["-N", "localhost", "-H", "X-Test"],
            "header field must be in the format \"key:value\"",
        ),
    ];
    for (args, message) in cases {
        let output = healthcheck(args).await;
        assert_eq!(output.status.code(), Some(1), "args {args:?}");
        assert_eq!(stderr(&output), message, "args {args:?}");
    }
}

#[tokio::test]
async fn test_unreachable_host_reports_transport_error() {
    let output = healthcheck(&["-U", &format!("http://127.0.0.1:{}/", closed_port())]).await;

    assert_eq!(output.status.code(), Some(1));
    let message = stderr(&output);
    assert!(message.contains("error sending request"), "{message}");
    assert!(!message.contains("didn't match"));
}

#[tokio::test]
async fn test_invalid_argument_exits_one() {
    let output = healthcheck(&["-U", "http://localhost/", "--code", "ok"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[tokio::test]
async fn test_version_flag() {
    let output = healthcheck(&["--version"]).await;
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("healthcheck"));
}
