use std::error::Error;
use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const WEB_PROJECT: &str = "//--- index.html ---\n<head><link rel=\"stylesheet\" href=\"style.css\"></head><body></body>\n//--- style.css ---\nb{color:red}\n//--- js/app.js ---\nconsole.log(1)\n";

const C_PROJECT: &str = "//--- main.c ---\n// input(\"Width\")\n// input(\"Height\")\nint main(void) { return 0; }\n";

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("pastepad-cli")?)
}

fn write_project(dir: &Path, text: &str) -> Result<String, Box<dyn Error>> {
    let path = dir.join("project.txt");
    fs::write(&path, text)?;
    Ok(path.to_str().unwrap().to_string())
}

#[test]
fn parse_lists_files_and_totals() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), WEB_PROJECT)?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "parse", &project])
        .assert()
        .success()
        .stdout(predicate::str::contains("index.html  0.0"))
        .stdout(predicate::str::contains("js/app.js"))
        .stdout(predicate::str::contains("3 file(s)"))
        .stdout(predicate::str::contains("lines •"));
    Ok(())
}

#[test]
fn parse_rejects_text_without_headers() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), "just some notes\n")?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "parse", &project])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to load project"));
    Ok(())
}

#[test]
fn tree_puts_folders_first() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), WEB_PROJECT)?;

    let output = cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "tree", &project])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "js/");
    assert!(lines[1].starts_with("  app.js  "));
    assert!(lines[2].starts_with("index.html  "));
    assert!(lines[3].starts_with("style.css  "));
    Ok(())
}

#[test]
fn preview_inlines_assets_into_output_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), WEB_PROJECT)?;
    let output = dir.path().join("out").join("preview.html");

    cli()?
        .args([
            "--workspace",
            dir.path().to_str().unwrap(),
            "preview",
            &project,
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let html = fs::read_to_string(&output)?;
    assert_eq!(
        html,
        "<head><style>b{color:red}</style></head><body><script>console.log(1)</script></body>"
    );
    Ok(())
}

#[test]
fn preview_without_html_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), C_PROJECT)?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "preview", &project])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no HTML file"));
    Ok(())
}

#[test]
fn inputs_lists_magic_marker_slots() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), C_PROJECT)?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "inputs", &project])
        .assert()
        .success()
        .stdout(predicate::str::contains("Language: c"))
        .stdout(predicate::str::contains("[0] Width"))
        .stdout(predicate::str::contains("[1] Height"));
    Ok(())
}

#[test]
fn inputs_hint_mentions_marker_for_c() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), "//--- main.c ---\nint main(void) { return 0; }\n")?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "inputs", &project])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"// input("Label")"#));
    Ok(())
}

#[test]
fn inputs_json_reports_schema() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), WEB_PROJECT)?;

    cli()?
        .args([
            "--workspace",
            dir.path().to_str().unwrap(),
            "inputs",
            &project,
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"not_needed\""));
    Ok(())
}

#[test]
fn run_refuses_blank_inputs_before_dispatch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), C_PROJECT)?;

    cli()?
        .args([
            "--workspace",
            dir.path().to_str().unwrap(),
            "run",
            &project,
            "--input",
            "3",
            "--endpoint",
            "http://127.0.0.1:9/unreachable",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing input values: [1] Height"));
    Ok(())
}

#[test]
fn run_rejects_web_projects() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), WEB_PROJECT)?;

    cli()?
        .args(["--workspace", dir.path().to_str().unwrap(), "run", &project])
        .assert()
        .failure()
        .stderr(predicate::str::contains("web projects cannot be run"));
    Ok(())
}

#[test]
fn run_reports_connection_errors_in_transcript() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let project = write_project(dir.path(), "//--- main.py ---\nprint(1)\n")?;

    cli()?
        .args([
            "--workspace",
            dir.path().to_str().unwrap(),
            "run",
            &project,
            "--endpoint",
            "http://127.0.0.1:9/unreachable",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("connection error"));
    Ok(())
}

#[test]
fn sample_prints_requested_project() -> Result<(), Box<dyn Error>> {
    cli()?
        .args(["sample", "web"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("//--- index.html ---"));
    cli()?
        .arg("sample")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Python"));
    Ok(())
}
