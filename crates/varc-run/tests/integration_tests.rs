use assert_cmd::cargo;
use rstest::rstest;
use scopeguard::defer;
use std::io::Write;
use std::{fs::File, path::PathBuf};

pub fn create_file(name: &str, content: &str) -> PathBuf {
    let temp_file_path = std::env::temp_dir().join(name);
    let mut file = File::create(&temp_file_path).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");

    temp_file_path
}

const REQUEST: &str = r#"{"method": "GET", "uri": "/a?x=1", "host": "example.com", "remote_addr": "10.0.0.1", "headers": {"X-Trace": "abc123"}, "args": {"x": "1"}}"#;

#[rstest]
#[case::plain("Host: $host", "Host: example.com\n")]
#[case::braced("${host}${path}", "example.com/a\n")]
#[case::escaped("$$host", "$host\n")]
#[case::header("trace=$header.x-trace", "trace=abc123\n")]
#[case::arg("x=${arg.x}", "x=1\n")]
fn test_render_with_stdin(
    #[case] template: &str,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("varc");

    cmd.arg("render")
        .arg(template)
        .write_stdin(REQUEST)
        .assert()
        .success()
        .code(0)
        .stdout(expected.to_string());

    Ok(())
}

#[test]
fn test_render_with_context_file() -> Result<(), Box<dyn std::error::Error>> {
    let context = create_file("varc_test_render_context.json", REQUEST);
    let context_clone = context.clone();

    defer! {
        if context_clone.exists() {
            std::fs::remove_file(&context_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("varc");
    cmd.arg("render")
        .arg("$request_line")
        .arg("--context")
        .arg(&context)
        .assert()
        .success()
        .stdout("GET /a?x=1\n");

    Ok(())
}

#[rstest]
#[case::unknown_variable("$nope")]
#[case::missing_header("$header.X-Missing")]
#[case::syntax_error("${host")]
fn test_render_failure(#[case] template: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("varc");

    cmd.args(["--quiet", "render", template])
        .write_stdin(REQUEST)
        .assert()
        .failure()
        .stdout("");

    Ok(())
}

#[test]
fn test_check() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("varc");

    cmd.env("NO_COLOR", "1")
        .args(["check", "$host$uri", "${header.X-Trace}"])
        .assert()
        .success()
        .stdout("Ok: $host$uri\nOk: ${header.X-Trace}\n");

    Ok(())
}

#[test]
fn test_check_reports_errors() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("varc");

    cmd.env("NO_COLOR", "1")
        .args(["check", "$host", "a ${header", "$hots"])
        .assert()
        .failure()
        .stdout(
            "Ok: $host\nError: a ${header\n  Unterminated variable, no closing `}` for `${` at 1:3\n\
             Error: $hots\n  Unknown variable \"hots\" at line 1, column 1\n",
        );

    Ok(())
}

#[test]
fn test_run() -> Result<(), Box<dyn std::error::Error>> {
    let config = create_file(
        "varc_test_run_config.toml",
        r#"
[options]
logging = false

[templates]
access_log = "$remote_addr \"$request_line\" ${header.X-Trace}"
upstream = "http://backend$uri"
"#,
    );
    let requests = create_file(
        "varc_test_run_requests.jsonl",
        &format!("{REQUEST}\n\n{{\"uri\": \"/b\"}}\n"),
    );
    let (config_clone, requests_clone) = (config.clone(), requests.clone());

    defer! {
        for path in [&config_clone, &requests_clone] {
            if path.exists() {
                std::fs::remove_file(path).expect("Failed to delete temp file");
            }
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("varc");
    cmd.arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--requests")
        .arg(&requests)
        .assert()
        .success()
        .stdout(concat!(
            r#"{"access_log":"10.0.0.1 \"GET /a?x=1\" abc123","upstream":"http://backend/a?x=1"}"#,
            "\n",
            r#"{"access_log":null,"upstream":"http://backend/b"}"#,
            "\n"
        ));

    Ok(())
}

#[test]
fn test_run_with_invalid_template() -> Result<(), Box<dyn std::error::Error>> {
    let config = create_file(
        "varc_test_run_invalid.toml",
        "[templates]\nbroken = \"$host.name\"\n",
    );
    let config_clone = config.clone();

    defer! {
        if config_clone.exists() {
            std::fs::remove_file(&config_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("varc");
    cmd.arg("run")
        .arg("--config")
        .arg(&config)
        .write_stdin(REQUEST)
        .assert()
        .failure();

    Ok(())
}

#[test]
fn test_vars() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = cargo::cargo_bin_cmd!("varc");

    let assert = cmd.env("NO_COLOR", "1").arg("vars").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;

    assert!(stdout.contains("host\tcacheable\n"));
    assert!(stdout.contains("header\tfieldable\n"));
    assert!(stdout.contains("uri\tplain\n"));

    Ok(())
}
