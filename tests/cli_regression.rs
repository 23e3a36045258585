// Regression tests for the `rulecraft` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn scratch(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rulecraft-cli-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn rulecraft() -> Command {
    let mut cmd = Command::cargo_bin("rulecraft").unwrap();
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn cli_check_accepts_bundled_grammar() {
    rulecraft()
        .args(["check", "tests/fixtures/pdx.grammar"])
        .assert()
        .success()
        .stdout(contains("ok").and(contains("with skip rule")));
}

#[test]
fn cli_check_rejects_unknown_entry() {
    rulecraft()
        .args(["check", "tests/fixtures/pdx.grammar", "--entry", "nope"])
        .assert()
        .failure()
        .stderr(contains("rulecraft::grammar::unknown_entry"));
}

#[test]
fn cli_reports_miette_diagnostics_on_bad_grammar() {
    let bad = scratch("bad.grammar", "entry = missing;");
    rulecraft()
        .arg("check")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("rulecraft::grammar").and(contains("missing")));
    let _ = fs::remove_file(bad);
}

#[test]
fn cli_parses_a_directory() {
    rulecraft()
        .args([
            "parse",
            "--grammar",
            "tests/fixtures/pdx.grammar",
            "--entry",
            "entry",
            "--exclude",
            "00_names.txt",
            "tests/fixtures/names",
        ])
        .assert()
        .success()
        .stdout(
            contains("ENG_names.txt")
                .and(contains("FRA_names.txt"))
                .and(contains("declrScope"))
                .and(contains("Acasta"))
                .and(contains("00_names.txt").not()),
        );
}

#[test]
fn cli_parse_json_output() {
    rulecraft()
        .args([
            "parse",
            "--grammar",
            "tests/fixtures/pdx.grammar",
            "--entry",
            "entry",
            "--json",
            "tests/fixtures/names/FRA_names.txt",
        ])
        .assert()
        .success()
        .stdout(contains("\"rule\":\"entry\"").and(contains("\"value\":\"FRA\"")));
}

#[test]
fn cli_reports_parse_errors() {
    let input = scratch("broken.txt", "ENG = { prefix = \"HMS\n");
    rulecraft()
        .args(["parse", "--grammar", "tests/fixtures/pdx.grammar", "--entry", "entry"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("rulecraft::parse::unexpected"));
    let _ = fs::remove_file(input);
}
