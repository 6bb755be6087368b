//! CLI integration tests for all implemented subcommands.
//!
//! Uses `assert_cmd` to spawn the `formwork` binary and verify exit
//! codes, stdout content, and stderr content. Each test gets its own
//! temp directory for the schema store and fixture files, so tests run
//! in parallel without sharing state.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn formwork() -> Command {
    Command::cargo_bin("formwork").expect("formwork binary")
}

/// Write a JSON fixture into the test's temp directory.
fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(&value).expect("serialize")).expect("write fixture");
    path
}

/// A draft with two inputs and one derived field chained off the date.
fn signup_draft() -> serde_json::Value {
    json!({
        "name": "Signup",
        "fields": [
            {
                "id": "f1", "type": "text", "label": "Email",
                "validations": {"required": true, "email": true}
            },
            {
                "id": "f2", "type": "date", "label": "DOB",
                "validations": {"required": true}
            },
            {
                "id": "f3", "type": "text", "label": "Age",
                "isDerived": true, "derivedFrom": ["DOB"],
                "formula": "computeAge(parents['DOB'])"
            }
        ]
    })
}

/// Save a draft and return the id the store assigned.
fn save_draft(store: &Path, file: &Path) -> String {
    let assert = formwork()
        .args(["--store", store.to_str().unwrap(), "--output", "json", "save"])
        .arg(file)
        .assert()
        .success();
    let saved: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("save output");
    saved["id"].as_str().expect("schema id").to_string()
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    formwork()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Formwork form-definition toolkit"));
}

#[test]
fn version_exits_0() {
    formwork()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("formwork"));
}

// ──────────────────────────────────────────────
// 2. Check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_valid_schema_exits_0() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(&tmp, "signup.json", signup_draft());
    formwork()
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid: 3 field(s), 1 derived"));
}

#[test]
fn check_json_output() {
    let tmp = TempDir::new().unwrap();
    let file = write_json(&tmp, "signup.json", signup_draft());
    formwork()
        .args(["--output", "json", "check"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": true"));
}

#[test]
fn check_reports_unknown_parent() {
    let tmp = TempDir::new().unwrap();
    let mut draft = signup_draft();
    draft["fields"][2]["derivedFrom"] = json!(["Birthday"]);
    let file = write_json(&tmp, "bad.json", draft);
    formwork()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown parent label 'Birthday'"));
}

#[test]
fn check_reports_formula_errors_with_field_and_column() {
    let tmp = TempDir::new().unwrap();
    let mut draft = signup_draft();
    draft["fields"][2]["formula"] = json!("computeAge(");
    let file = write_json(&tmp, "bad.json", draft);
    formwork()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("in field 'Age'").and(predicate::str::contains("column")));
}

#[test]
fn check_rejects_cyclic_derivations() {
    let tmp = TempDir::new().unwrap();
    let draft = json!({
        "name": "Loop",
        "fields": [
            {
                "id": "f1", "type": "number", "label": "A",
                "isDerived": true, "derivedFrom": ["B"], "formula": "parents['B']"
            },
            {
                "id": "f2", "type": "number", "label": "B",
                "isDerived": true, "derivedFrom": ["A"], "formula": "parents['A']"
            }
        ]
    });
    let file = write_json(&tmp, "loop.json", draft);
    formwork()
        .arg("check")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "cyclic derivation involving fields: A, B",
        ));
}

#[test]
fn check_missing_file_exits_1() {
    formwork()
        .args(["check", "no_such_schema_xyz.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading"));
}

// ──────────────────────────────────────────────
// 3. Save, list, delete
// ──────────────────────────────────────────────

#[test]
fn save_assigns_identity_and_persists() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());

    let id = save_draft(&store, &file);
    assert_eq!(id.len(), 36, "expected a uuid, got {}", id);

    formwork()
        .args(["--store", store.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signup").and(predicate::str::contains(id)));
}

#[test]
fn save_rejects_invalid_drafts() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let mut draft = signup_draft();
    draft["fields"][1]["label"] = json!("Email");
    let file = write_json(&tmp, "dup.json", draft);

    formwork()
        .args(["--store", store.to_str().unwrap(), "save"])
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("duplicate field label 'Email'"));
    assert!(!store.exists(), "a rejected draft must not create the store");
}

#[test]
fn list_with_no_store_reports_empty() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("missing.json");
    formwork()
        .args(["--store", store.to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no saved schemas"));
}

#[test]
fn delete_removes_schema_and_unknown_id_errors() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());
    let id = save_draft(&store, &file);

    formwork()
        .args(["--store", store.to_str().unwrap(), "delete", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    formwork()
        .args(["--store", store.to_str().unwrap(), "delete", id.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("schema not found"));
}

// ──────────────────────────────────────────────
// 4. Preview subcommand
// ──────────────────────────────────────────────

#[test]
fn preview_unknown_id_exits_1() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    formwork()
        .args(["--store", store.to_str().unwrap(), "preview", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("schema not found: nope"));
}

#[test]
fn preview_applies_values_and_computes_derived_fields() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());
    let id = save_draft(&store, &file);
    let values = write_json(
        &tmp,
        "values.json",
        json!({"Email": "me@example.com", "DOB": "2010-06-15"}),
    );

    formwork()
        .args([
            "--store",
            store.to_str().unwrap(),
            "preview",
            id.as_str(),
            "--values",
            values.to_str().unwrap(),
            "--today",
            "2026-08-25",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Age = 16"));
}

#[test]
fn preview_rejects_values_for_unknown_fields() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());
    let id = save_draft(&store, &file);
    let values = write_json(&tmp, "values.json", json!({"Ghost": "boo"}));

    formwork()
        .args([
            "--store",
            store.to_str().unwrap(),
            "preview",
            id.as_str(),
            "--values",
            values.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown field 'Ghost'"));
}

#[test]
fn preview_submit_is_gated_on_validation() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());
    let id = save_draft(&store, &file);

    // untouched required fields block the submit
    formwork()
        .args([
            "--store",
            store.to_str().unwrap(),
            "preview",
            id.as_str(),
            "--submit",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Please fix errors before submitting."))
        .stderr(predicate::str::contains("Email: This field is required"));

    let values = write_json(
        &tmp,
        "values.json",
        json!({"Email": "me@example.com", "DOB": "2010-06-15"}),
    );
    formwork()
        .args([
            "--store",
            store.to_str().unwrap(),
            "preview",
            id.as_str(),
            "--values",
            values.to_str().unwrap(),
            "--submit",
            "--today",
            "2026-08-25",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("submitted").and(predicate::str::contains("Age = 16")));
}

#[test]
fn preview_json_reports_validation_errors() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store.json");
    let file = write_json(&tmp, "signup.json", signup_draft());
    let id = save_draft(&store, &file);
    let values = write_json(&tmp, "values.json", json!({"Email": "nope"}));

    formwork()
        .args([
            "--store",
            store.to_str().unwrap(),
            "--output",
            "json",
            "preview",
            id.as_str(),
            "--values",
            values.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Email\": \"Invalid email address\""));
}

// ──────────────────────────────────────────────
// 5. Eval subcommand
// ──────────────────────────────────────────────

#[test]
fn eval_computes_arithmetic() {
    formwork()
        .args(["eval", "1 + 2 * 3"])
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn eval_reads_parents_from_file() {
    let tmp = TempDir::new().unwrap();
    let parents = write_json(&tmp, "parents.json", json!({"A": "3", "B": 4}));
    formwork()
        .args(["eval", "sum(parents['A'], parents['B'])", "--parents"])
        .arg(&parents)
        .assert()
        .success()
        .stdout("7\n");
}

#[test]
fn eval_uses_sample_values_for_a_derived_field() {
    let tmp = TempDir::new().unwrap();
    let draft = json!({
        "name": "Order",
        "fields": [
            {"id": "f1", "type": "number", "label": "Price"},
            {"id": "f2", "type": "number", "label": "Qty"},
            {
                "id": "f3", "type": "number", "label": "Total",
                "isDerived": true, "derivedFrom": ["Price", "Qty"],
                "formula": "sum(parents['Price'], parents['Qty'])"
            }
        ]
    });
    let file = write_json(&tmp, "order.json", draft);
    formwork()
        .args(["eval", "sum(parents['Price'], parents['Qty'])", "--sample-schema"])
        .arg(&file)
        .args(["--field", "Total"])
        .assert()
        .success()
        .stdout("20\n");
}

#[test]
fn eval_compute_age_honors_today() {
    formwork()
        .args(["eval", "computeAge('2000-01-01')", "--today", "2026-08-25"])
        .assert()
        .success()
        .stdout("26\n");
}

#[test]
fn eval_json_output_includes_value_and_display() {
    formwork()
        .args(["--output", "json", "eval", "2 + 2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"display\": \"4\""));
}

#[test]
fn eval_reports_syntax_errors() {
    formwork()
        .args(["eval", "sum(1,"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn quiet_suppresses_output_but_keeps_exit_codes() {
    formwork()
        .args(["--quiet", "eval", "nonsense("])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}
