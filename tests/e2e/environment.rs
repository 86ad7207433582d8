//! Environment, config file, and rate endpoint end-to-end tests.

use serde_json::json;

use crate::common::cli::{CliResult, CliRunner};
use crate::common::fixtures::LEGACY_DATA;
use crate::common::init_test_logging;
use crate::common::rate_server::RateServer;

/// Run the binary without stalling the runtime that serves the rates.
fn run_blocking(cli: &CliRunner, args: &[&str]) -> CliResult {
    tokio::task::block_in_place(|| cli.run(args))
}

fn priced_inventory(cli: &CliRunner) {
    let _ = cli.add("Laptop", &["-p", "100", "-c", "laptop"]);
}

#[test]
fn inv_format_env_selects_json() {
    init_test_logging();
    let cli = CliRunner::new().with_env("INV_FORMAT", "json");

    let result = cli.run(&["list"]);
    result.assert_success();
    assert!(result.json().is_array());
}

#[test]
fn no_color_env_is_accepted() {
    init_test_logging();
    let cli = CliRunner::new().with_env("NO_COLOR", "1");

    cli.run(&["categories"])
        .assert_success()
        .assert_stdout_contains("Phone")
        .assert_stdout_not_contains("\u{1b}[");
}

#[test]
fn data_file_defaults_to_user_data_dir() {
    init_test_logging();
    let cli = CliRunner::new().without_pinned_data_file();
    let _ = cli.add("iPhone 13", &[]);

    assert!(cli.data_dir().join("devices.json").is_file());
    assert!(!cli.data_file().exists());
}

#[test]
fn implicit_config_sets_data_file_and_currency() {
    init_test_logging();
    let cli = CliRunner::new().without_pinned_data_file();
    std::fs::create_dir_all(cli.config_dir()).unwrap();
    std::fs::write(
        cli.config_dir().join("config.toml"),
        "data_file = \"mine.json\"\n\n[currency]\nbase = \"gbp\"\n",
    )
    .unwrap();

    let _ = cli.add("iPhone 13", &[]);
    assert!(cli.config_dir().join("mine.json").is_file());

    let result = cli.run_robot(&["config"]);
    result
        .assert_success()
        .assert_json_field("/currency/base", &json!("GBP"))
        .assert_json_field("/currency/target", &json!("USD"));

    cli.run_robot(&["config", "--path"])
        .assert_success()
        .assert_json_field("/exists", &json!(true));
}

#[test]
fn explicit_config_must_exist() {
    init_test_logging();
    let cli = CliRunner::new();
    let missing = cli.home().join("nope.yaml");

    let result = cli.run_robot(&["--config", missing.to_str().unwrap(), "list"]);
    result.assert_failure();
    assert!(
        result.error_json()["message"]
            .as_str()
            .unwrap()
            .contains("Configuration file not found")
    );
}

#[test]
fn invalid_config_fails_before_touching_data() {
    init_test_logging();
    let cli = CliRunner::new();
    let config = cli.home().join("config.yaml");
    std::fs::write(&config, "currency:\n  base: euro\n").unwrap();

    cli.run(&["--config", config.to_str().unwrap(), "add", "Phone"])
        .assert_failure()
        .assert_stderr_contains("Invalid configuration");
    assert!(!cli.data_file().exists());
}

#[test]
fn legacy_data_file_is_listed() {
    init_test_logging();
    let cli = CliRunner::new();
    std::fs::write(cli.data_file(), LEGACY_DATA).unwrap();

    let result = cli.run_robot(&["list"]);
    result
        .assert_success()
        .assert_json_array_len("", 3)
        .assert_json_field("/0/deviceName", &json!("iPhone 12"))
        .assert_json_field("/0/purchaseDate", &json!("2023-11-20"))
        .assert_json_field("/1/deviceCategory", &json!("SpeakerHub"));
    assert_eq!(
        std::fs::read_to_string(cli.data_file()).unwrap(),
        LEGACY_DATA,
        "reading never rewrites the file"
    );
}

#[test]
fn legacy_ids_are_stable_across_runs() {
    init_test_logging();
    let cli = CliRunner::new();
    std::fs::write(cli.data_file(), LEGACY_DATA).unwrap();

    let first = cli.run_robot(&["list"]).json();
    let second = cli.run_robot(&["list"]).json();
    assert_eq!(first, second);

    let id = first[1]["id"].as_str().unwrap().to_string();
    cli.run_robot(&["show", &id])
        .assert_success()
        .assert_json_field("/deviceName", &json!("Kitchen speaker"));
}

#[test]
fn corrupt_data_file_is_left_alone() {
    init_test_logging();
    let cli = CliRunner::new();
    std::fs::write(cli.data_file(), "[{ broken").unwrap();

    cli.run_robot(&["list"]).assert_success().assert_json_array_len("", 0);
    cli.run(&["total"]).assert_success().assert_stdout_contains("(0 devices)");

    assert_eq!(std::fs::read_to_string(cli.data_file()).unwrap(), "[{ broken");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn total_converts_with_rate_endpoint() {
    init_test_logging();
    let server = RateServer::start().await;
    let cli = CliRunner::new().with_env("INV_RATE_ENDPOINT", &server.endpoint());
    priced_inventory(&cli);

    let result = run_blocking(&cli, &["--robot", "total", "--convert"]);
    result
        .assert_success()
        .assert_json_field("/summary/total", &json!("100"))
        .assert_json_field("/summary/currency", &json!("EUR"))
        .assert_json_field("/summary/converted/currency", &json!("USD"))
        .assert_json_field("/summary/converted/amount", &json!("108.00"))
        .assert_json_field("/conversion/state", &json!("succeeded"));
    assert_eq!(server.hits(), 1);

    run_blocking(&cli, &["total", "-c"])
        .assert_success()
        .assert_stdout_contains("108.00 USD")
        .assert_stdout_contains("(rate 1.08)");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn total_target_flag_and_env() {
    init_test_logging();
    let server = RateServer::start().await;
    let cli = CliRunner::new()
        .with_env("INV_RATE_ENDPOINT", &server.endpoint())
        .with_env("INV_TARGET_CURRENCY", "jpy");
    priced_inventory(&cli);

    run_blocking(&cli, &["--robot", "total", "--convert"])
        .assert_success()
        .assert_json_field("/summary/converted/currency", &json!("JPY"))
        .assert_json_field("/summary/converted/amount", &json!("16150.0"));

    run_blocking(&cli, &["--robot", "total", "--target", "gbp"])
        .assert_success()
        .assert_json_field("/summary/converted/currency", &json!("GBP"))
        .assert_json_field("/summary/converted/amount", &json!("86.00"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_conversion_still_reports_total() {
    init_test_logging();
    let server = RateServer::start().await;
    let cli = CliRunner::new()
        .with_env("INV_RATE_ENDPOINT", &server.endpoint())
        .with_env("INV_BASE_CURRENCY", "ERR");
    priced_inventory(&cli);

    let result = run_blocking(&cli, &["--robot", "total", "--convert"]);
    result
        .assert_success()
        .assert_json_field("/summary/total", &json!("100"))
        .assert_json_field("/conversion/state", &json!("failed"));
    assert!(result.json()["summary"].get("converted").is_none());

    run_blocking(&cli, &["total", "--convert"])
        .assert_success()
        .assert_stdout_contains("100")
        .assert_stderr_contains("Warning: Total not converted");
}

#[test]
fn unreachable_endpoint_is_not_fatal() {
    init_test_logging();
    let cli = CliRunner::new().with_env("INV_RATE_ENDPOINT", "http://127.0.0.1:1/latest");
    priced_inventory(&cli);

    cli.run(&["total", "--target", "usd"])
        .assert_success()
        .assert_stderr_contains("Total not converted: Rate lookup failed");
}

#[test]
fn invalid_currency_code_is_an_error() {
    init_test_logging();
    let cli = CliRunner::new();
    priced_inventory(&cli);

    cli.run(&["total", "--target", "dollars"])
        .assert_failure()
        .assert_stderr_contains("Invalid currency code 'dollars'");
}

#[test]
fn config_init_writes_default_file_once() {
    init_test_logging();
    let cli = CliRunner::new();
    let path = cli.config_dir().join("config.toml");

    cli.run(&["config", "--init"])
        .assert_success()
        .assert_stdout_contains("Wrote default configuration");
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[currency]"));

    cli.run_robot(&["config", "--path"])
        .assert_success()
        .assert_json_field("/exists", &json!(true));
    cli.run_robot(&["config"])
        .assert_success()
        .assert_json_field("/currency/base", &json!("EUR"));

    let result = cli.run_robot(&["config", "--init"]);
    result.assert_failure();
    assert!(
        result.error_json()["message"]
            .as_str()
            .unwrap()
            .contains("already exists")
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
}

#[test]
fn config_init_honours_explicit_path() {
    init_test_logging();
    let cli = CliRunner::new();
    let path = cli.home().join("inv.yaml");

    cli.run(&["--config", path.to_str().unwrap(), "config", "--init"])
        .assert_success();

    cli.run_robot(&["--config", path.to_str().unwrap(), "config"])
        .assert_success()
        .assert_json_field("/currency/target", &json!("USD"));
}
