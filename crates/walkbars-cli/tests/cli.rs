//! End-to-end tests for the `walkbars` binary.

use std::fs::{create_dir, read_to_string, write};
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn walkbars(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_walkbars"))
        .args(args)
        .current_dir(dir)
        .env_remove("WALKBARS_DATA")
        .env_remove("WALKBARS_PARTIALS")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path().join("page.hbs"), "<h1>{{title}}</h1>{{> footer}}").unwrap();
    write(dir.path().join("data.json"), r#"{"title": "Tom & Jerry", "year": 1940}"#).unwrap();
    write(dir.path().join("footer.hbs"), "<p>{{year}}</p>").unwrap();
    dir
}

// =============================================================================
// render
// =============================================================================

#[test]
fn render_with_data_and_partial() {
    let dir = workspace();
    let output = walkbars(
        dir.path(),
        &["render", "page.hbs", "--data", "data.json", "--partial", "footer=footer.hbs"],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "<h1>Tom &amp; Jerry</h1><p>1940</p>");
}

#[test]
fn render_without_escaping() {
    let dir = workspace();
    let output = walkbars(
        dir.path(),
        &["render", "page.hbs", "-d", "data.json", "-p", "footer=footer.hbs", "--no-escape"],
    );
    assert_eq!(stdout(&output), "<h1>Tom & Jerry</h1><p>1940</p>");
}

#[test]
fn render_from_partials_dir() {
    let dir = workspace();
    create_dir(dir.path().join("partials")).unwrap();
    write(dir.path().join("partials/footer.hbs"), "[{{year}}]").unwrap();
    write(dir.path().join("partials/notes.txt"), "ignored").unwrap();
    let output = walkbars(
        dir.path(),
        &["render", "page.hbs", "--data", "data.json", "--partials-dir", "partials"],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "<h1>Tom &amp; Jerry</h1>[1940]");
}

#[test]
fn render_json_output() {
    let dir = workspace();
    write(dir.path().join("plain.hbs"), "{{title}}").unwrap();
    let output = walkbars(dir.path(), &["render", "plain.hbs", "--data", "data.json", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["result"], "Tom &amp; Jerry");
}

#[test]
fn render_error_exits_with_data_error() {
    let dir = workspace();
    let output = walkbars(dir.path(), &["render", "page.hbs", "--data", "data.json"]);
    assert_eq!(output.status.code(), Some(exitcode::DATAERR));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("footer"), "{stderr}");
}

// =============================================================================
// check / precompile
// =============================================================================

#[test]
fn check_reports_ok_and_failures() {
    let dir = workspace();
    write(dir.path().join("broken.hbs"), "{{#if a}}\n{{/each}}").unwrap();

    let output = walkbars(dir.path(), &["check", "page.hbs"]);
    assert!(output.status.success(), "{output:?}");

    let output = walkbars(dir.path(), &["check", "page.hbs", "broken.hbs", "--json"]);
    assert_eq!(output.status.code(), Some(exitcode::DATAERR));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["ok"], true);
    assert_eq!(json[0]["call_sites"][0]["callee"], "title");
    assert_eq!(json[1]["ok"], false);
    assert!(json[1]["error"].as_str().unwrap().contains("if doesn't match each"));
}

#[test]
fn precompile_writes_spec() {
    let dir = workspace();
    let output = walkbars(dir.path(), &["precompile", "page.hbs", "--output", "page.json"]);
    assert!(output.status.success(), "{output:?}");
    let text = read_to_string(dir.path().join("page.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["src_name"], "page.hbs");
    let spec: serde_json::Value = serde_json::from_str(json["spec"].as_str().unwrap()).unwrap();
    assert_eq!(spec["body"][0]["type"], "ContentStatement");
}
