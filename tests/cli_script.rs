mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quote_core_cli").unwrap();
    cmd.env("QUOTE_CORE_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("QUOTE_CORE_TEST_INPUTS");
    cmd
}

#[test]
fn estimate_prints_monthly_range() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["estimate", "5000", "weekly"])
        .assert()
        .success()
        .stdout(contains("Estimated range: $779 - $953 per month"));
}

#[test]
fn estimate_below_minimum_has_no_range() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["estimate", "500", "daily"])
        .assert()
        .success()
        .stdout(contains("No estimate available").and(contains("$").not()));
}

#[test]
fn estimate_rejects_unknown_frequency() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["estimate", "5000", "hourly"])
        .assert()
        .failure()
        .stderr(contains("Unknown frequency `hourly`"));
}

#[test]
fn config_set_persists_between_runs() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["config", "set", "fallback_phone", "(737) 555-0100"])
        .assert()
        .success();

    cli(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("fallback_phone: (737) 555-0100"));

    cli(&home)
        .args(["config", "set", "quote_endpoint", "not-a-url"])
        .assert()
        .failure()
        .stderr(contains("quote_endpoint"));
}

#[test]
fn unknown_command_fails() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("invoice")
        .assert()
        .failure()
        .stderr(contains("Unknown command `invoice`"));
}

#[test]
fn scripted_quote_is_posted_to_endpoint() {
    let (endpoint, server) = common::serve_once("200 OK", r#"{"success":true}"#);
    let home = common::home_with_endpoint(&endpoint);

    cli(&home)
        .arg("quote")
        .env("QUOTE_CORE_TEST_INPUTS", common::script(&["<CONFIRM>"]))
        .assert()
        .success()
        .stdout(
            contains("Estimated range: $779 - $953")
                .and(contains("Facility type: Medical / healthcare"))
                .and(contains("Thank you!")),
        );

    let request = server.join().unwrap();
    assert!(request.head.starts_with("POST /api/lead"));
    assert!(request.header("x-submission-id").is_some());
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["squareFootage"], 5000);
    assert_eq!(body["frequency"], "weekly");
    assert_eq!(body["facilityType"], "medical");
    assert_eq!(body["consent"], true);
    assert!(body.get("website").is_none());
}

#[test]
fn unreachable_endpoint_shows_fallback_phone() {
    // Nothing listens on the discard port.
    let home = common::home_with_endpoint("http://127.0.0.1:9/api/quote");

    cli(&home)
        .arg("quote")
        .env("QUOTE_CORE_TEST_INPUTS", common::script(&["<CONFIRM>"]))
        .assert()
        .success()
        .stdout(
            contains("We couldn't submit your request. Please call us at (512) 555-0142.")
                .and(contains("Form closed. Your request was not received."))
                .and(contains("Nothing was sent").not()),
        );
}

#[test]
fn invalid_step_reprompts_before_moving_on() {
    let home = common::home_with_endpoint("http://127.0.0.1:9/api/quote");
    let inputs = [
        "Dana Whitfield",
        "Northgate Dental",
        "not-an-email",
        "5125550188",
        "dana@northgate.example",
        "<KEEP>",
        "<CANCEL>",
    ]
    .join("|");

    cli(&home)
        .arg("quote")
        .env("QUOTE_CORE_TEST_INPUTS", inputs)
        .assert()
        .success()
        .stdout(
            contains("Email: Please enter a valid email address")
                .and(contains("Step 2 of 3: Facility"))
                .and(contains("Form cancelled")),
        );
}
