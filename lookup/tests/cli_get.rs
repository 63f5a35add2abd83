//! CLI tests for the `lookup` binary.
//!
//! Spawns the binary against the sample tree and checks output and exit codes.

use std::process::{Command, Output};

use lookup::exit_codes;
use lookup::io::config::LookupConfig;
use lookup::test_support::TestContent;

fn lookup(content: &TestContent, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lookup"))
        .current_dir(content.path())
        .args(args)
        .output()
        .expect("run lookup")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn get_prints_found_value() {
    let content = TestContent::new().expect("content");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(
        &content,
        &["get", "--tree", tree, "/content/page1/jcr:content", "jcr:title"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "page1");
}

#[test]
fn get_prints_default_for_missing_resource() {
    let content = TestContent::new().expect("content");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(
        &content,
        &[
            "get",
            "--tree",
            tree,
            "--default",
            "defaultText",
            "/content/page1/jcr:content/par",
            "jcr:title",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::DEFAULTED));
    assert_eq!(stdout(&output), "defaultText");
}

#[test]
fn get_follow_resolves_reference() {
    let content = TestContent::new().expect("content");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(
        &content,
        &["get", "--tree", tree, "--follow", "/content/page2/jcr:content", "ref"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "/content/page3");
}

#[test]
fn admin_without_permission_is_recovered() {
    let content = TestContent::new().expect("content");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(
        &content,
        &[
            "get",
            "--tree",
            tree,
            "--admin",
            "--on-error",
            "defaultOnException",
            "/content/page1/jcr:content",
            "jcr:title",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::RECOVERED));
    assert_eq!(stdout(&output), "defaultOnException");
}

#[test]
fn admin_allowed_by_config_reads_value() {
    let content = TestContent::new().expect("content");
    let config = content
        .write_config(&LookupConfig {
            allow_administrative: true,
            ..LookupConfig::default()
        })
        .expect("config");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(
        &content,
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "get",
            "--tree",
            tree,
            "--admin",
            "/content/page1/jcr:content",
            "jcr:title",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "page1");
}

#[test]
fn validate_and_init() {
    let content = TestContent::new().expect("content");
    let tree = content.tree_path.to_str().expect("utf8 path");
    let output = lookup(&content, &["validate", tree]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let output = lookup(&content, &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(content.path().join("lookup.toml").exists());

    let output = lookup(&content, &["validate", "missing.json"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}
