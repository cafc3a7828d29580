//! Smoke tests for the routecov CLI
//!
//! These tests run the binary against small projects on disk.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command for the routecov binary
fn routecov() -> Command {
    Command::cargo_bin("routecov").expect("routecov binary should exist")
}

const ORDERS_RS: &str = r#"
impl RouteBuilder for OrderRoutes {
    fn configure(&self, r: &mut Routes) {
        r.from("direct:orders")
            .route_id("orders")
            .to("mock:a")
            .choice()
                .when(header("vip").is_equal_to(true))
                    .to("mock:b")
                .otherwise()
                    .to("mock:c")
            .end();
    }
}
"#;

const FULL_DUMP: &str = r#"<routeStat>
  <route id="orders" exchangesTotal="3">
    <to uri="mock:a" exchangesTotal="3"/>
    <choice exchangesTotal="3">
      <when exchangesTotal="2"><to uri="mock:b" exchangesTotal="2"/></when>
      <otherwise exchangesTotal="1"><to uri="mock:c" exchangesTotal="1"/></otherwise>
    </choice>
  </route>
</routeStat>"#;

const WHEN_ONLY_DUMP: &str = r#"<routeStat>
  <route id="orders">
    <to exchangesTotal="1"/>
    <choice exchangesTotal="1">
      <when exchangesTotal="1"><to exchangesTotal="1"/></when>
      <otherwise exchangesTotal="0"><to exchangesTotal="0"/></otherwise>
    </choice>
  </route>
</routeStat>"#;

fn project(dump: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src").join("orders.rs"), ORDERS_RS).unwrap();
    if let Some(dump) = dump {
        let dir = temp.path().join("target").join("route-coverage");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("OrdersTest.xml"), dump).unwrap();
    }
    temp
}

fn base_dir(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    routecov()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    routecov()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("coverage"))
        .stdout(predicate::str::contains("routes"));
}

#[test]
fn test_no_args_shows_help() {
    routecov().assert().failure(); // Requires a subcommand
}

#[test]
fn test_coverage_subcommand_help() {
    routecov()
        .args(["coverage", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-on-error"))
        .stdout(predicate::str::contains("--dump-dir"));
}

// ============================================================================
// Routes Command
// ============================================================================

#[test]
fn test_routes_lists_tree() {
    let temp = project(None);
    routecov()
        .args(["routes", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Route orders discovered in file src/orders.rs"))
        .stdout(predicate::str::contains("0\tfrom"))
        .stdout(predicate::str::contains("3\t    when"));
}

#[test]
fn test_routes_json() {
    let temp = project(None);
    let output = routecov()
        .args(["routes", "--format", "json", "--base-dir", &base_dir(temp.path())])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["routes"][0]["route_id"], "orders");
    assert_eq!(json["routes"][0]["nodes"].as_array().unwrap().len(), 7);
}

#[test]
fn test_routes_reports_parse_failures_and_continues() {
    let temp = project(None);
    fs::write(temp.path().join("src").join("broken.rs"), "impl {").unwrap();
    routecov()
        .args(["routes", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stderr(predicate::str::contains("broken.rs"))
        .stdout(predicate::str::contains("Discovered 1 routes"));
}

#[test]
fn test_routes_warns_once_about_anonymous_routes() {
    let temp = project(None);
    fs::write(
        temp.path().join("src").join("anon.rs"),
        "impl RouteBuilder for Anon { fn configure(&self, r: &mut Routes) { r.from(\"direct:x\").to(\"mock:y\"); } }",
    )
    .unwrap();
    routecov()
        .args(["routes", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stderr(predicate::function(|err: &str| {
            err.matches("Discovered 1 anonymous routes").count() == 1
        }))
        .stdout(predicate::str::contains("1 anonymous skipped"));
}

#[test]
fn test_routes_indent_flag() {
    let temp = project(None);
    routecov()
        .args([
            "routes",
            "--color",
            "never",
            "--indent",
            "4",
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\t    to"))
        .stdout(predicate::str::contains("3\t        when"));
}

// ============================================================================
// Coverage Command
// ============================================================================

#[test]
fn test_coverage_fully_covered() {
    let temp = project(Some(FULL_DUMP));
    routecov()
        .args([
            "coverage",
            "--color",
            "never",
            "--fail-on-error",
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("6/6 steps covered"))
        .stdout(predicate::str::contains("2\t3\t  choice"));
}

#[test]
fn test_coverage_verbose_shows_dump_details() {
    let temp = project(Some(FULL_DUMP));
    routecov()
        .args(["coverage", "-v", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Route orders: 1 dump documents, 0 unmatched entries, 0 rejected dumps",
        ));
}

#[test]
fn test_coverage_default_hides_dump_details() {
    let temp = project(Some(FULL_DUMP));
    routecov()
        .args(["coverage", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("dump documents").not());
}

#[test]
fn test_coverage_incomplete_without_flag_succeeds() {
    let temp = project(Some(WHEN_ONLY_DUMP));
    routecov()
        .args(["coverage", "--color", "never", "--base-dir", &base_dir(temp.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("4/6 steps covered"))
        .stdout(predicate::str::contains("5\t0\t    otherwise"));
}

#[test]
fn test_coverage_incomplete_with_flag_fails() {
    let temp = project(Some(WHEN_ONLY_DUMP));
    routecov()
        .args([
            "coverage",
            "--color",
            "never",
            "--fail-on-error",
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Some routes are not fully covered"));
}

#[test]
fn test_coverage_excluded_route_is_not_checked() {
    let temp = project(None);
    routecov()
        .args([
            "coverage",
            "--fail-on-error",
            "--excludes",
            "orders.rs",
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .assert()
        .success();
}

#[test]
fn test_coverage_custom_dump_dir_and_json() {
    let temp = project(None);
    let dumps = temp.path().join("dumps");
    fs::create_dir_all(&dumps).unwrap();
    fs::write(dumps.join("a.xml"), FULL_DUMP).unwrap();
    let output = routecov()
        .args([
            "coverage",
            "--format",
            "json",
            "--dump-dir",
            "dumps",
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["reports"][0]["route_id"], "orders");
    assert_eq!(json["reports"][0]["nodes"][0]["count"], 3);
}

#[test]
fn test_invalid_catalog_is_fatal() {
    let temp = project(None);
    let catalog = temp.path().join("catalog.json");
    fs::write(&catalog, "{}").unwrap();
    routecov()
        .args([
            "coverage",
            "--catalog",
            &catalog.display().to_string(),
            "--base-dir",
            &base_dir(temp.path()),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_missing_base_dir_is_fatal() {
    routecov()
        .args(["coverage", "--base-dir", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}
