use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env("BF_CONFIG", "/nonexistent/bf.toml")
        .env_remove("BF_TIMEOUT_MS")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+[")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parse error: unmatched bracket '['").and(predicate::str::contains("at instruction 1")))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_unmatched_close_bracket_error_points_at_caret() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("+]")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("unmatched bracket ']' at instruction 1")
                .and(predicate::str::contains("  +]\n   ^")),
        );
}

#[test]
fn test_every_dangling_open_is_reported() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("[[")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("at instruction 0")
                .and(predicate::str::contains("at instruction 1")),
        );
}

#[test]
fn test_comments_do_not_shift_error_positions() {
    // Only Brainfuck characters are counted: "+" is 0, "]" is 1.
    cargo_bin()
        .timeout(Duration::from_secs(2)).arg("run").arg("add + then close ]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at instruction 1"));
}

#[test]
fn test_pointer_out_of_bounds_keeps_partial_output() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).args(["run", "--tape-size", "2", "+.>>"])
        .assert()
        .code(1)
        .stdout("\u{1}\n")
        .stderr(
            predicate::str::contains("Runtime error: pointer out of bounds (address=2, bound=1)")
                .and(predicate::str::contains("at instruction 3")),
        );
}

#[test]
fn test_pointer_below_zero_on_fixed_tape() {
    cargo_bin()
        .timeout(Duration::from_secs(2)).args(["run", "--tape-size", "4", "<"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("address=-1, bound=0"));
}

#[test]
fn test_oversized_tape_is_a_config_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--tape-size", "18446744073709551615", "+."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("exceeds the addressable maximum"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_huge_wrapping_tape_runs_without_preallocating() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--tape-size", "100000000000", "--wrap", "<+.>>+."])
        .assert()
        .success()
        .stdout("\u{1}\u{1}\n");
}
