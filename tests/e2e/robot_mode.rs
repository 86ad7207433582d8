//! Robot-mode end-to-end tests.

use serde_json::{json, Value};

use crate::common::cli::CliRunner;
use crate::common::init_test_logging;

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run(&["--robot"]);
    result.assert_success();

    let json = result.json();
    assert_eq!(json["tool"], "inv");
    assert!(json.get("browse").is_some());
    assert!(json.get("edit").is_some());
    assert!(json.get("output_modes").is_some());
}

#[test]
fn robot_list_outputs_json_array() {
    init_test_logging();
    let cli = CliRunner::new();

    cli.run_robot(&["list"]).assert_success().assert_json_array_len("", 0);
}

#[test]
fn robot_add_reports_insert() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["add", "iPhone 13", "-p", "799", "-c", "phone"]);
    result.assert_success();

    result
        .assert_json_field("/ok", &json!(true))
        .assert_json_field("/result/action", &json!("inserted"))
        .assert_json_field("/result/position", &json!(0))
        .assert_json_field("/device/deviceName", &json!("iPhone 13"))
        .assert_json_field("/device/purchasePrice", &json!("799"))
        .assert_json_field("/device/deviceCategory", &json!("Phone"))
        .assert_json_field("/device/model", &json!("iPhone 12"));
    assert!(result.json()["device"]["id"].is_string());
}

#[test]
fn robot_full_editing_flow() {
    init_test_logging();
    let cli = CliRunner::new();
    let first = cli.add("iPhone 13", &["-p", "10"]);
    let _ = cli.add("Broken watch", &["-p", "abc", "-c", "watch"]);
    let third = cli.add("AirPods Pro", &["-p", "5.5", "-c", "earphones"]);

    // Move by id prefix.
    let result = cli.run_robot(&["move", &third[..8], "0"]);
    result
        .assert_success()
        .assert_json_field("/from", &json!(2))
        .assert_json_field("/to", &json!(0));
    assert_eq!(cli.names(), ["AirPods Pro", "iPhone 13", "Broken watch"]);

    // Edit by full id keeps the id and position.
    let result = cli.run_robot(&["edit", &first, "--price", "12"]);
    result
        .assert_success()
        .assert_json_field("/result/action", &json!("replaced"))
        .assert_json_field("/result/position", &json!(1))
        .assert_json_field("/device/id", &json!(first));

    let result = cli.run_robot(&["show", "1"]);
    result
        .assert_success()
        .assert_json_field("/position", &json!(1))
        .assert_json_field("/purchasePrice", &json!("12"));

    let result = cli.run_robot(&["total"]);
    result
        .assert_success()
        .assert_json_field("/summary/total", &json!("17.5"))
        .assert_json_field("/summary/device_count", &json!(3))
        .assert_json_field("/summary/unparsed_prices", &json!(1));
    assert!(result.json().get("conversion").is_none());

    let result = cli.run_robot(&["remove", "0", "2"]);
    result
        .assert_success()
        .assert_json_field("/remaining", &json!(1))
        .assert_json_array_len("/removed", 2);
    assert_eq!(cli.names(), ["iPhone 13"]);
}

#[test]
fn robot_list_includes_positions() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("A", &[]);
    let _ = cli.add("B", &[]);

    let result = cli.run_robot(&["list"]);
    result.assert_success();

    let json = result.json();
    let positions: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, [0, 1]);
}

#[test]
fn robot_error_goes_to_stderr_with_suggestion() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["show", "0"]);
    result.assert_failure();

    assert!(result.stdout.trim().is_empty());
    let err = result.error_json();
    assert_eq!(err["error"], true);
    assert_eq!(err["recoverable"], true);
    assert!(err["message"].as_str().unwrap().contains("Invalid position 0"));
    assert!(err["suggestion"].as_str().unwrap().contains("inv list"));
}

#[test]
fn robot_remove_is_all_or_nothing() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("A", &[]);
    let _ = cli.add("B", &[]);

    let result = cli.run_robot(&["remove", "0", "7"]);
    result.assert_failure();

    assert_eq!(result.error_json()["error"], true);
    assert_eq!(cli.names(), ["A", "B"]);
}

#[test]
fn robot_compact_json_is_one_line() {
    init_test_logging();
    let cli = CliRunner::new();
    let _ = cli.add("A", &[]);

    let result = cli.run(&["list", "--format=json-compact"]);
    result.assert_success();

    assert_eq!(result.stdout.trim().lines().count(), 1);
    assert!(result.json().is_array());
}

#[test]
fn robot_categories_lists_all() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["categories"]);
    result.assert_success().assert_json_array_len("", 5);

    let json = result.json();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, ["Phone", "Laptop", "Watch", "SpeakerHub", "Earphones"]);
}

#[test]
fn robot_config_shows_effective_settings() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["config"]);
    result.assert_success();

    let json = result.json();
    assert_eq!(json["config_file"], Value::Null);
    assert_eq!(
        json["data_file"].as_str().map(std::path::PathBuf::from),
        Some(cli.data_file())
    );
    assert_eq!(json["currency"]["base"], "EUR");
    assert_eq!(json["currency"]["target"], "USD");
}

#[test]
fn robot_config_path_points_into_config_dir() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["config", "--path"]);
    result
        .assert_success()
        .assert_json_field("/exists", &json!(false));

    let path = result.json()["path"].as_str().unwrap().to_string();
    assert_eq!(
        std::path::PathBuf::from(path),
        cli.config_dir().join("config.toml")
    );
}

#[test]
fn robot_version_outputs_build_info() {
    init_test_logging();
    let cli = CliRunner::new();
    let result = cli.run_robot(&["version"]);
    result
        .assert_success()
        .assert_json_field("/version", &json!(env!("CARGO_PKG_VERSION")));

    assert!(result.json()["git_dirty"].is_boolean());
}

#[test]
fn robot_total_survives_out_of_range_prices() {
    init_test_logging();
    let cli = CliRunner::new();
    let max = "79228162514264337593543950335";
    let _ = cli.add("A", &["-p", max]);
    let _ = cli.add("B", &["-p", max]);

    cli.run_robot(&["total"])
        .assert_success()
        .assert_json_field("/summary/total", &json!(max))
        .assert_json_field("/summary/overflowed_prices", &json!(1));

    cli.run(&["total"])
        .assert_success()
        .assert_stdout_contains("1 price(s) left out");
}
