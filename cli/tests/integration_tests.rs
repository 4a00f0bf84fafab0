use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const HEADER: &str = "\
BOX       xmin ymin zmin dx dy dz
          use:    creates a rectangular box
          notes:
              xmin,ymin,zmin are the coordinates of one corner
              dx,dy,dz are the lengths

UNION     toMark=0 trimList=0 maxtol=0
          use:    perform Boolean union
";

fn csm_docs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csm-docs"))
        .args(args)
        .output()
        .expect("failed to run csm-docs")
}

fn write_header(dir: &Path) -> PathBuf {
    let path = dir.join("OpenCSM.h");
    fs::write(&path, HEADER).expect("failed to write header");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

#[test]
fn extract_prints_index_json() {
    let dir = tempfile::tempdir().unwrap();
    let header = write_header(dir.path());

    let output = csm_docs(&["extract", "--header", header.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["BOX"]["syntax"], "BOX xmin ymin zmin dx dy dz");
    assert_eq!(
        value["BOX"]["notes"],
        "xmin,ymin,zmin are the coordinates of one corner\\ndx,dy,dz are the lengths"
    );
    assert_eq!(value["UNION"]["usage"], "perform Boolean union");
}

#[test]
fn extract_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let header = write_header(dir.path());
    let index = dir.path().join("csm-documentation.json");

    let output = csm_docs(&[
        "extract",
        "--header",
        header.to_str().unwrap(),
        "--output",
        index.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    let raw = fs::read_to_string(&index).unwrap();
    assert!(raw.contains("\"name\": \"UNION\""));
}

#[test]
fn extract_yaml_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let header = write_header(dir.path());

    let output = csm_docs(&[
        "extract",
        "--header",
        header.to_str().unwrap(),
        "--format",
        "yaml",
        "--with-report",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_yaml::Value = serde_yaml::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["report"]["commands"].as_u64(), Some(2));
    assert_eq!(
        value["commands"]["BOX"]["usage"].as_str(),
        Some("creates a rectangular box")
    );
}

#[test]
fn extract_missing_header_fails() {
    let output = csm_docs(&["extract", "--header", "/nonexistent/OpenCSM.h"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Failed to read '/nonexistent/OpenCSM.h'"));
}

// ---------------------------------------------------------------------------
// build / grammar / validate
// ---------------------------------------------------------------------------

#[test]
fn build_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let header = write_header(dir.path());
    let index = dir.path().join("csm-documentation.json");
    let grammar = dir.path().join("csm.tmLanguage.json");
    let report = dir.path().join("build-report.json");

    let output = csm_docs(&[
        "build",
        "--config",
        dir.path().join("csm-docs.yml").to_str().unwrap(),
        "--header",
        header.to_str().unwrap(),
        "--index",
        index.to_str().unwrap(),
        "--grammar",
        grammar.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("from 2 command(s) (index extracted, written)"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["index_source"], "extracted");
    assert_eq!(report["grammar_sha256"].as_str().unwrap().len(), 64);

    let output = csm_docs(&[
        "validate",
        "--index",
        index.to_str().unwrap(),
        "--grammar",
        grammar.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Validated index"));
    assert!(stdout(&output).contains("Validated grammar"));
}

#[test]
fn build_uses_config_file_paths() {
    let dir = tempfile::tempdir().unwrap();
    write_header(dir.path());
    let config = dir.path().join("csm-docs.yml");
    let grammar = dir.path().join("out.json");
    fs::write(
        &config,
        format!(
            "paths:\n  header: {}\n  index: {}\n  grammar: {}\ngrammar:\n  scope_name: source.ocsm\n",
            dir.path().join("OpenCSM.h").display(),
            dir.path().join("index.json").display(),
            grammar.display()
        ),
    )
    .unwrap();

    let output = csm_docs(&["build", "--config", config.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&grammar).unwrap()).unwrap();
    assert_eq!(value["scopeName"], "source.ocsm");
    assert!(dir.path().join("index.json").exists());
}

#[test]
fn grammar_without_index_is_keyword_only() {
    let dir = tempfile::tempdir().unwrap();

    let output = csm_docs(&[
        "grammar",
        "--index",
        dir.path().join("absent.json").to_str().unwrap(),
        "--config",
        dir.path().join("absent.yml").to_str().unwrap(),
        "--name",
        "OpenCSM",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "OpenCSM");
    assert_eq!(value["scopeName"], "source.csm");
    assert!(value["repository"]["function-calls"].is_object());
}

#[test]
fn grammar_output_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = dir.path().join("csm.tmLanguage.json");
    fs::write(&grammar, "previous grammar").unwrap();

    let output = csm_docs(&[
        "grammar",
        "--index",
        dir.path().join("absent.json").to_str().unwrap(),
        "--config",
        dir.path().join("absent.yml").to_str().unwrap(),
        "--output",
        grammar.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&grammar).unwrap()).unwrap();
    assert_eq!(value["scopeName"], "source.csm");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn failed_output_replace_keeps_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let header = write_header(dir.path());
    let target = dir.path().join("index.yaml");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("previous.yaml"), "BOX: {}\n").unwrap();

    let output = csm_docs(&[
        "extract",
        "--header",
        header.to_str().unwrap(),
        "--format",
        "yaml",
        "--output",
        target.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: failed to replace"));
    assert_eq!(
        fs::read_to_string(target.join("previous.yaml")).unwrap(),
        "BOX: {}\n"
    );
    let mut entries: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["OpenCSM.h", "index.yaml"]);
}

#[test]
fn validate_reports_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = dir.path().join("broken.json");
    fs::write(
        &grammar,
        r##"{"name": "CSM", "scopeName": "source.csm", "patterns": [{"include": "#missing"}], "repository": {}}"##,
    )
    .unwrap();

    let output = csm_docs(&["validate", "--grammar", grammar.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("\"missing\""));
    assert!(stderr(&output).contains("error: 1 validation error(s)"));
}

#[test]
fn validate_requires_an_input() {
    let output = csm_docs(&["validate"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--index or --grammar"));
}

// ---------------------------------------------------------------------------
// hover
// ---------------------------------------------------------------------------

fn built_index(dir: &Path) -> PathBuf {
    let header = write_header(dir);
    let index = dir.join("csm-documentation.json");
    let output = csm_docs(&[
        "extract",
        "--header",
        header.to_str().unwrap(),
        "--output",
        index.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    index
}

#[test]
fn hover_markdown_for_lowercase_token() {
    let dir = tempfile::tempdir().unwrap();
    let index = built_index(dir.path());

    let output = csm_docs(&["hover", "box", "--index", index.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "```csm\nBOX xmin ymin zmin dx dy dz\n```\n\n\
         **Usage**: creates a rectangular box\n\n\
         **Notes**:\n\nxmin,ymin,zmin are the coordinates of one corner  \ndx,dy,dz are the lengths"
    );
}

#[test]
fn hover_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let index = built_index(dir.path());

    let output = csm_docs(&[
        "hover",
        "Union",
        "--index",
        index.to_str().unwrap(),
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "UNION");
    assert!(value.get("notes").is_none());
}

#[test]
fn hover_unknown_token_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let index = built_index(dir.path());

    let output = csm_docs(&["hover", "sphere", "--index", index.to_str().unwrap()]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("no documentation for 'sphere'"));
}

#[test]
fn hover_with_malformed_index_finds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("csm-documentation.json");
    fs::write(&index, "not json").unwrap();

    let output = csm_docs(&["hover", "box", "--index", index.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("no documentation for 'box'"));
}
