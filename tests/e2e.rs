use std::process::Command;

fn run(fixture: &str) -> (String, String, bool) {
    let path = format!("tests/fixtures/{fixture}");
    let output = Command::new(env!("CARGO_BIN_EXE_cap-eng"))
        .arg(&path)
        .env("RUST_LOG", "warn")
        .env("SALARY_CAP_LIMIT", "100000000")
        .env("CAP_YEAR", "2025")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn league_cap_table() {
    let (stdout, stderr, success) = run("league.json");

    assert!(success);
    assert!(stderr.is_empty());

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "team,players,total_cap,cap_space");
    assert_eq!(lines[1], "ARI,2,16000000.00,84000000.00");
    assert_eq!(lines[2], "SEA,1,8000000.00,92000000.00");
    assert_eq!(lines.len(), 3);
}

#[test]
fn released_players_do_not_count() {
    let (stdout, _, success) = run("with_released.json");

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    // One of ARI's two players is released: off the roster, off the cap.
    assert_eq!(lines[1], "ARI,1,10000000.00,90000000.00");
}

#[test]
fn missing_file_fails_with_an_error() {
    let (stdout, stderr, success) = run("does_not_exist.json");

    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("dataset missing"));
}

#[test]
fn malformed_file_fails_with_an_error() {
    let (stdout, stderr, success) = run("malformed.json");

    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("cannot parse"));
}
