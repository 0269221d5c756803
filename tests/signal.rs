use assert_cmd::prelude::*;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

#[cfg(unix)]
#[test]
fn sigint_during_execution_keeps_output_and_exits_0() {
    // "+." prints \x01, then "[]" spins forever on a non-zero cell.
    let child = Command::cargo_bin("bf")
        .unwrap()
        .args(["run", "+.[]"])
        .env("BF_CONFIG", "/nonexistent/bf.toml")
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(500));
    let kill = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.starts_with(b"\x01"), "stdout: {:?}", output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Execution cancelled after 1 output byte(s)"), "stderr: {stderr}");
}
