use std::process::Command;

/// Nothing listens on the discard port, so every request fails to dispatch
const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

fn run_against_unreachable_endpoint(app_env: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_order-history"))
        .arg("list-tables")
        .env("APP_ENV", app_env)
        .env("DYNAMODB_ENDPOINT_URL", UNREACHABLE_ENDPOINT)
        .env("AWS_REGION", "ap-northeast-1")
        .env("AWS_ACCESS_KEY_ID", "dummy")
        .env("AWS_SECRET_ACCESS_KEY", "dummy")
        .env("TRACING_LEVEL", "info")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run order-history")
}

#[test]
fn test_json_logs_stay_off_stdout() {
    let output = run_against_unreachable_endpoint("production");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.is_empty(), "unexpected stdout: {stdout}");
    assert!(stderr.contains("Starting order history driver"));
    assert!(stderr.contains("===================== listTables error ====================="));
}

#[test]
fn test_plain_logs_stay_off_stdout() {
    let output = run_against_unreachable_endpoint("development");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.is_empty(), "unexpected stdout: {stdout}");
}
