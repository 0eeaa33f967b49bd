use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
local_domain = "social.example"

[[directory]]
username = "alice"
url = "https://social.example/@alice"
"#;

#[test]
fn formats_stdin_as_a_local_status() {
    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.write_stdin("a < b\n\n#Rust");

    cmd.assert().success().stdout(predicate::eq(
        "<p>a &lt; b</p><p><a href=\"https://localhost/tags/rust\" class=\"mention hashtag\">\
         #<span>Rust</span></a></p>\n",
    ));
}

#[test]
fn mentions_come_from_the_config_directory() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("statusfmt.toml");
    fs::write(&config, CONFIG).unwrap();
    let input = dir.path().join("status.txt");
    fs::write(&input, "hi @alice and @bob").unwrap();

    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.arg("--config")
        .arg(&config)
        .args(["--mention", "alice@social.example"])
        .arg(&input);

    cmd.assert().success().stdout(
        predicate::str::contains("href=\"https://social.example/@alice\"")
            .and(predicate::str::contains("and @bob</p>")),
    );
}

#[test]
fn remote_plaintext_strips_tags() {
    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.args(["--remote", "--plaintext"])
        .write_stdin("<p>Hello <b>world</b></p>");

    cmd.assert().success().stdout(predicate::eq("Hello world\n"));
}

#[test]
fn finalize_highlights_fenced_code() {
    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.args(["--finalize", "--theme", "dark"])
        .write_stdin("```rust\nfn main() {}\n```");

    cmd.assert().success().stdout(
        predicate::str::contains("data-highlighted=\"true\"")
            .and(predicate::str::contains("class=\"hljs\""))
            .and(predicate::str::contains("style=\"")),
    );
}

#[test]
fn page_wraps_output_in_a_document() {
    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.arg("--page").write_stdin("hello");

    cmd.assert().success().stdout(
        predicate::str::starts_with("<!DOCTYPE html>")
            .and(predicate::str::contains("<style>"))
            .and(predicate::str::contains("<p>hello</p>")),
    );
}

#[test]
fn notes_resolve_any_directory_account() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("statusfmt.toml");
    fs::write(&config, CONFIG).unwrap();

    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.arg("--config")
        .arg(&config)
        .arg("--note")
        .write_stdin("ask @alice");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("class=\"u-url mention\""));
}

#[test]
fn missing_input_file_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.arg(dir.path().join("missing.txt"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "local_domain = [").unwrap();

    let mut cmd = cargo_bin_cmd!("statusfmt");
    cmd.arg("--config").arg(&config).write_stdin("hi");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
