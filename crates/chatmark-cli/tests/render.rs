use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const MESSAGE: &str = "<think>\n\nCheck the docs first.\n\n</think>\n\nRun `ls`:\n\n```sh\nls -la\n```\n";

#[test]
fn test_render_stdin_to_html() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .arg("render")
        .write_stdin(MESSAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("思考完毕 ▲"))
        .stdout(predicate::str::contains("Check the docs first."))
        .stdout(predicate::str::contains("<code>ls</code>"))
        .stdout(predicate::str::contains("data-language=\"sh\""))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_render_file_while_thinking() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("message.md");
    fs::write(&input, MESSAGE).unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--thinking"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("正在思考 ▲"));
}

#[test]
fn test_render_collapsed_block_hides_reasoning() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--collapse", "think-0"])
        .write_stdin(MESSAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("思考完毕 ▼"))
        .stdout(predicate::str::contains("Check the docs first.").not());
}

#[test]
fn test_render_repeated_collapse_key_stays_closed() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--collapse", "think-0", "--collapse", "think-0"])
        .write_stdin(MESSAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("思考完毕 ▼"))
        .stdout(predicate::str::contains("Check the docs first.").not());
}

#[test]
fn test_render_unknown_collapse_key_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--collapse", "think-9"])
        .write_stdin(MESSAGE)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No thinking block 'think-9'"))
        .stderr(predicate::str::contains("think-0"));
}

#[test]
fn test_render_json_tree() {
    let dir = tempdir().unwrap();

    let output = cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--json"])
        .write_stdin("`x=1`")
        .output()
        .unwrap();

    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["type"], "element");
    assert_eq!(tree["value"]["tag"], "div");
    let paragraph = &tree["value"]["children"][0]["value"];
    assert_eq!(paragraph["tag"], "p");
    assert_eq!(paragraph["children"][0]["value"]["tag"], "code");
}

#[test]
fn test_render_uses_config_labels() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[think]\nlabel_finished = \"Thought it through\"\n").unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render", "--config"])
        .arg(&config)
        .write_stdin(MESSAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("Thought it through ▲"));
}

#[test]
fn test_render_missing_file_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("chatmark")
        .env("CHATMARK_HOME", dir.path())
        .args(["render"])
        .arg(dir.path().join("missing.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
