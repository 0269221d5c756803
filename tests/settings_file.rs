use assert_cmd::Command;
use predicates::prelude::*;

fn with_settings(content: &str) -> (tempfile::TempDir, Command) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bf.toml");
    std::fs::write(&path, content).unwrap();
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", &path)
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG");
    (dir, cmd)
}

#[test]
fn tape_size_from_settings_bounds_the_pointer() {
    let (_dir, mut cmd) = with_settings("[interpreter]\ntape_size = 2\n");
    cmd.args(["run", "+>>"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pointer out of bounds"));
}

#[test]
fn flags_override_settings() {
    let (_dir, mut cmd) = with_settings("[interpreter]\ntape_size = 2\n");
    cmd.args(["run", "--tape-size", "8", "+>>."])
        .assert()
        .success()
        .stdout("\u{0}\n");
}

#[test]
fn wrap_from_settings() {
    let (_dir, mut cmd) = with_settings("[interpreter]\ntape_size = 3\ntape_wrap = true\n");
    cmd.args(["run", "+>>>."])
        .assert()
        .success()
        .stdout("\u{1}\n");
}

#[test]
fn max_steps_from_settings() {
    let (_dir, mut cmd) = with_settings("[interpreter]\nmax_steps = 10\n");
    cmd.args(["run", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (10)"));
}

#[test]
fn invalid_setting_is_warned_and_ignored() {
    let (_dir, mut cmd) = with_settings("[interpreter]\ntape_size = many\n");
    cmd.args(["run", "<+."])
        .assert()
        .success()
        .stdout("\u{1}\n")
        .stderr(predicate::str::contains("invalid value"));
}
