#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn pymprims(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pymprims"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("pymprims should run")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be utf-8")
}

#[test]
fn encode_prints_wire_string() {
    let output = pymprims(&[
        "--format", "raw", "encode", "--id", "graphic", "--type", "height", "--payload", "400",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "pymxPYMxgraphicxPYMxheightxPYMx400\n");
}

#[test]
fn encode_rejects_type_with_whitespace() {
    let output = pymprims(&["encode", "--id", "graphic", "--type", "bad type"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid message type"));
}

#[test]
fn decode_prints_json_message() {
    let output = pymprims(&[
        "--format",
        "json",
        "decode",
        "--id",
        "graphic",
        "pymxPYMxgraphicxPYMxnavigateToxPYMxhttps://a.example/?q=1",
    ]);
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(stdout_of(&output).trim()).expect("output should be json");
    assert_eq!(value["channel_id"], "graphic");
    assert_eq!(value["message_type"], "navigateTo");
    assert_eq!(value["payload"], "https://a.example/?q=1");
}

#[test]
fn decode_exits_data_invalid_for_other_channel() {
    let output = pymprims(&[
        "decode",
        "--id",
        "graphic",
        "pymxPYMxgraphic2xPYMxheightxPYMx400",
    ]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
}

#[test]
fn decode_stdin_skips_foreign_lines() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pymprims"))
        .args(["--log-level", "error", "--format", "raw", "decode", "--id", "a"])
        .arg("--stdin")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(
            b"pymxPYMxaxPYMxwidthxPYMx640\nnoise\npymxPYMxbxPYMxwidthxPYMx1\npymxPYMxaxPYMxheightxPYMx300\n",
        )
        .expect("stdin should accept input");
    let output = child.wait_with_output().expect("decode should finish");

    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "640\n300\n");
}

#[test]
fn check_url_flags_unsafe_schemes() {
    let output = pymprims(&[
        "--format",
        "raw",
        "check-url",
        "https://example.com/",
        "javascript:alert(1)",
        "/relative/path",
    ]);
    assert_eq!(output.status.code(), Some(60));
    assert_eq!(stdout_of(&output), "safe\nunsafe\nsafe\n");
}

#[test]
fn check_url_passes_when_all_safe() {
    let output = pymprims(&["check-url", "mailto:desk@example.com"]);
    assert!(output.status.success());
}

#[test]
fn check_origin_anchors_pattern_at_end() {
    let accepted = pymprims(&[
        "--format",
        "raw",
        "check-origin",
        "--pattern",
        r"\.example\.com",
        "https://graphics.example.com",
    ]);
    assert!(accepted.status.success());
    assert_eq!(stdout_of(&accepted), "safe\n");

    let rejected = pymprims(&[
        "check-origin",
        "--pattern",
        r"\.example\.com",
        "https://graphics.example.com.evil.test",
    ]);
    assert_eq!(rejected.status.code(), Some(60));
}

#[test]
fn frame_src_appends_parameters_before_fragment() {
    let output = pymprims(&[
        "--format",
        "raw",
        "frame-src",
        "https://graphics.example.com/child.html?v=2#top",
        "--child-id",
        "graphic",
        "--width",
        "640",
        "--title",
        "A Story",
        "--parent-url",
        "https://news.example.com/story.html",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "https://graphics.example.com/child.html?v=2&initialWidth=640&childId=graphic\
         &parentTitle=A%20Story&parentUrl=https%3A%2F%2Fnews.example.com%2Fstory.html#top\n"
    );
}

#[test]
fn frame_src_without_optional_params() {
    let output = pymprims(&[
        "--format",
        "raw",
        "frame-src",
        "child.html",
        "--child-id",
        "c",
        "--width",
        "300",
        "--no-optional-params",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "child.html?initialWidth=300&childId=c\n");
}

#[test]
fn simulate_reports_boot_height_and_resize() {
    let output = pymprims(&[
        "--format",
        "json",
        "simulate",
        "--content-height",
        "512",
        "--resize",
        "320",
    ]);
    assert!(output.status.success());

    let exchanges: Vec<serde_json::Value> = stdout_of(&output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();
    assert_eq!(exchanges[0]["direction"], "to-parent");
    assert_eq!(exchanges[0]["message_type"], "height");
    assert_eq!(exchanges[0]["payload"], "512");
    assert!(exchanges
        .iter()
        .any(|exchange| exchange["message_type"] == "width" && exchange["payload"] == "320"));
}

#[test]
fn version_prints_package_name() {
    let output = pymprims(&["version"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).starts_with("pymprims "));
}

#[test]
fn extended_version_reports_build_facts() {
    let output = pymprims(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("profile: "));
    assert!(stdout.contains("rustc: rustc "));
    assert!(stdout.contains("protocol: tag=pym delimiter=xPYMx"));
}
