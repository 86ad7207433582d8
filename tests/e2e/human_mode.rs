//! Human-mode end-to-end tests.

use predicates::prelude::*;

use crate::common::cli::CliRunner;
use crate::common::init_test_logging;

#[test]
fn quick_start_without_command() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.assert_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"))
        .stdout(predicate::str::contains("inv --robot <command>"));
}

#[test]
fn empty_list_points_at_add() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.assert_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No devices yet"))
        .stdout(predicate::str::contains("inv add <NAME>"));
    assert!(!cli.data_file().exists(), "listing never creates the data file");
}

#[test]
fn add_list_show_edit_flow() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.run(&["add", "MacBook Air", "-c", "laptop", "-p", "1199", "-d", "2023-11-20"])
        .assert_success()
        .assert_stdout_contains("Added MacBook Air at position 0");
    cli.run(&["add", "AirPods Pro", "--category", "AirPods", "--price", "249"])
        .assert_success()
        .assert_stdout_contains("at position 1");

    cli.run(&["ls"])
        .assert_success()
        .assert_stdout_contains("MacBook Air")
        .assert_stdout_contains("🎧 Earphones")
        .assert_stdout_contains("1199");

    cli.run(&["show", "0"])
        .assert_success()
        .assert_stdout_contains("#0 MacBook Air")
        .assert_stdout_contains("💻 Laptop")
        .assert_stdout_contains("2023-11-20")
        .assert_stdout_contains("(placeholder)");

    cli.run(&["edit", "1", "--serial", "H1X9", "--name", "AirPods Pro 2"])
        .assert_success()
        .assert_stdout_contains("Updated AirPods Pro 2 at position 1");
    cli.run(&["show", "1"])
        .assert_success()
        .assert_stdout_contains("H1X9")
        .assert_stdout_contains("249");
}

#[test]
fn edit_without_fields_changes_nothing() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("iPhone 13", &[]);
    let before = std::fs::read_to_string(cli.data_file()).unwrap();

    cli.run(&["edit", "0"])
        .assert_success()
        .assert_stdout_contains("Nothing to change");

    assert_eq!(std::fs::read_to_string(cli.data_file()).unwrap(), before);
}

#[test]
fn move_and_remove_report_changes() {
    init_test_logging();
    let cli = CliRunner::new();
    for name in ["A", "B", "C"] {
        let _ = cli.add(name, &[]);
    }

    cli.run(&["mv", "2", "0"])
        .assert_success()
        .assert_stdout_contains("Moved C from 2 to 0");
    cli.run(&["rm", "0", "2"])
        .assert_success()
        .assert_stdout_contains("Removed C")
        .assert_stdout_contains("Removed B")
        .assert_stdout_contains("1 device(s) left");

    assert_eq!(cli.names(), ["A"]);
}

#[test]
fn total_reports_unreadable_prices() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("iPhone 13", &["-p", "10"]);
    let _ = cli.add("Broken watch", &["-p", "abc", "-c", "watch"]);
    let _ = cli.add("AirPods Pro", &["-p", "5,5", "-c", "earphones"]);

    cli.run(&["total"])
        .assert_success()
        .assert_stdout_contains("15.5")
        .assert_stdout_contains("(3 devices)")
        .assert_stdout_contains("1 price(s) could not be read");
}

#[test]
fn missing_device_fails_with_hint() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("iPhone 13", &[]);

    let result = cli.run(&["show", "5"]);
    result
        .assert_failure()
        .assert_stderr_contains("Error: Invalid position 5: inventory has 1 devices")
        .assert_stderr_contains("Hint: Positions start at 0");
    assert_eq!(result.exit_code, 1);

    cli.run(&["show", "zzzz"])
        .assert_failure()
        .assert_stderr_contains("Device not found: zzzz");
}

#[test]
fn bad_arguments_are_usage_errors() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.assert_cmd()
        .args(["add", "Toaster", "--category", "toaster"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown device category 'toaster'"));
    cli.assert_cmd()
        .args(["add", "Phone", "--date", "20/11/2023"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
    cli.assert_cmd().arg("remove").assert().code(2);

    assert!(!cli.data_file().exists());
}

#[test]
fn quiet_suppresses_confirmations() {
    init_test_logging();
    let cli = CliRunner::new();

    let result = cli.run(&["-q", "add", "Silent"]);
    result.assert_success();
    assert!(result.stdout.trim().is_empty(), "unexpected output: {}", result.stdout);
    assert_eq!(cli.names(), ["Silent"]);
}

#[test]
fn categories_list_suggested_models() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.assert_cmd()
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("SpeakerHub"))
        .stdout(predicate::str::contains("HomePod Mini"));
}

#[test]
fn version_shows_package_version() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.run(&["version"])
        .assert_success()
        .assert_stdout_contains(env!("CARGO_PKG_VERSION"))
        .assert_stdout_contains("Git SHA");
}

#[test]
fn completions_are_generated() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.assert_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_inv()"));
}

#[test]
fn output_has_no_escape_codes_when_piped() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("iPhone 13", &["-p", "10"]);

    cli.assert_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}[").not());
}
