use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI against `api_url` with an isolated HOME for credential storage.
pub fn run_cli_with_env(args: &[&str], home: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bistro"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("BISTRO_API_URL", api_url);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so the mock server keeps serving.
pub async fn run(args: &[&str], home: &Path, api_url: &str) -> Output {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let home = home.to_path_buf();
    let api_url = api_url.to_string();
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &home, &api_url)
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI off the async runtime and expect success.
pub async fn run_success(args: &[&str], home: &Path, api_url: &str) -> String {
    let output = run(args, home, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}
