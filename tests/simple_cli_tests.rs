use assert_cmd::cargo::cargo_bin_cmd;

/// Tests that `--help` is handled successfully by the CLI.
///
/// This test verifies:
/// 1. Running `newsteps-cli --help` exits successfully
/// 2. The help text lists the command groups
/// 3. No unexpected stderr output is produced
#[test]
fn test_cli_help_success() {
    let mut cmd = cargo_bin_cmd!("newsteps-cli");

    let assert = cmd.arg("--help").assert().success();

    let out = assert.get_output();
    let stdout = String::from_utf8_lossy(&out.stdout);
    for group in ["auth", "shoe", "donation", "order", "volunteer", "setting", "email", "user", "stats"] {
        assert!(stdout.contains(group), "missing {} in help:\n{}", group, stdout);
    }
    assert!(
        out.stderr.is_empty(),
        "expected empty stderr for --help, got:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Tests that a subcommand's help renders
#[test]
fn test_cli_subcommand_help() {
    let mut cmd = cargo_bin_cmd!("newsteps-cli");

    let assert = cmd.args(["shoe", "list", "--help"]).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("--size"));
    assert!(stdout.contains("--search"));
}

/// Tests that an unknown command fails with a usage error
#[test]
fn test_cli_unknown_command_fails() {
    let mut cmd = cargo_bin_cmd!("newsteps-cli");
    cmd.arg("frobnicate").assert().failure();
}

/// Tests that `--help` is handled successfully by the server binary.
#[test]
fn test_server_help_success() {
    let mut cmd = cargo_bin_cmd!("newsteps");

    let assert = cmd.arg("--help").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("--database-url"));
    assert!(stdout.contains("--bootstrap-admin-email"));
}
