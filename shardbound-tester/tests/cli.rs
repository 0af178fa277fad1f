use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "shardbound-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_shardbound-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--seeds", "1,2,harbor", "--steps", "50", "--report", "json", "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["summary"]["runs"], 3);
    assert_eq!(report["summary"]["passed"], 3);
}

#[test]
fn cli_reports_are_reproducible() {
    let exe = env!("CARGO_BIN_EXE_shardbound-tester");
    let run = |label: &str| {
        let path = temp_path(label);
        let status = Command::new(exe)
            .args([
                "--seeds", "77", "--steps", "80", "--algo", "xoshiro128", "--report", "json",
                "--output",
            ])
            .arg(&path)
            .status()
            .expect("run cli");
        assert!(status.success());
        std::fs::read_to_string(path).expect("read output")
    };
    assert_eq!(run("first"), run("second"));
}

#[test]
fn cli_console_report_shows_banner() {
    let exe = env!("CARGO_BIN_EXE_shardbound-tester");
    let output = Command::new(exe)
        .args(["--seeds", "3", "--steps", "20"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Shardbound Encounter Tester"));
    assert!(stdout.contains("Encounter Sweep Summary"));
}

#[test]
fn cli_rejects_bad_win_rate() {
    let exe = env!("CARGO_BIN_EXE_shardbound-tester");
    let output = Command::new(exe)
        .args(["--win-rate", "1.5"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--win-rate"));
}

#[test]
fn cli_rejects_missing_world_file() {
    let exe = env!("CARGO_BIN_EXE_shardbound-tester");
    let output = Command::new(exe)
        .args(["--world"])
        .arg(temp_path("absent-world"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
