//! CLI preview subcommand.
//!
//! Renders one saved schema as a fillable instance: seeds defaults,
//! applies --values edits, and prints inputs, derived values, and
//! validation state in declared field order. With --submit the gated
//! submit path runs and the exit code reflects whether it went through.

use std::path::Path;
use std::process;

use formwork_eval::{FormInstance, Value};
use formwork_storage::{JsonFileStore, SchemaStore};

use crate::{eval_context, read_values_file, report_error, OutputFormat};

pub fn cmd_preview(
    id: &str,
    values_path: Option<&Path>,
    submit: bool,
    today: Option<&str>,
    store_path: &Path,
    output: OutputFormat,
    quiet: bool,
) {
    // 1. Load the schema
    let store = JsonFileStore::new(store_path);
    let schema = match store.find_by_id(id) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("{}", e), output, quiet);
            process::exit(1);
        }
    };

    // 2. Build the instance and apply edits
    let ctx = eval_context(today, output, quiet);
    let mut instance = FormInstance::with_context(schema, ctx);

    if let Some(path) = values_path {
        for (label, value) in read_values_file(path, output, quiet) {
            if let Err(e) = instance.set_input(&label, value) {
                report_error(&e, output, quiet);
                process::exit(1);
            }
        }
    }

    // 3. Submit path: full validation gates the combined values
    if submit {
        match instance.submit() {
            Ok(values) => {
                if !quiet {
                    match output {
                        OutputFormat::Text => {
                            println!("submitted");
                            for (label, value) in &values {
                                println!("  {} = {}", label, value.display_string());
                            }
                        }
                        OutputFormat::Json => {
                            let values: serde_json::Map<String, serde_json::Value> = values
                                .iter()
                                .map(|(label, value)| (label.clone(), value.to_json()))
                                .collect();
                            let json = serde_json::json!({
                                "submitted": true,
                                "values": values,
                            });
                            println!(
                                "{}",
                                serde_json::to_string_pretty(&json).unwrap_or_default()
                            );
                        }
                    }
                }
            }
            Err(message) => {
                match output {
                    OutputFormat::Text => {
                        if !quiet {
                            eprintln!("{}", message);
                            for (label, error) in instance.errors() {
                                if !error.is_empty() {
                                    eprintln!("  - {}: {}", label, error);
                                }
                            }
                        }
                    }
                    OutputFormat::Json => {
                        let json = serde_json::json!({
                            "submitted": false,
                            "error": message,
                            "errors": nonempty_errors(&instance),
                        });
                        eprintln!(
                            "{}",
                            serde_json::to_string_pretty(&json).unwrap_or_default()
                        );
                    }
                }
                process::exit(1);
            }
        }
        return;
    }

    // 4. Render current state
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => print_instance_text(&instance),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&instance_json(&instance)).unwrap_or_default()
            );
        }
    }
}

fn print_instance_text(instance: &FormInstance) {
    let schema = instance.schema();
    println!("{} ({})", schema.name, schema.id);
    for field in &schema.fields {
        if field.is_derived {
            let value = instance
                .derived_values()
                .get(&field.label)
                .map(String::as_str)
                .unwrap_or("");
            match instance.formula_failures().get(&field.label) {
                Some(failure) => {
                    println!("  {} = {}  [formula error: {}]", field.label, value, failure)
                }
                None => println!("  {} = {}  (derived)", field.label, value),
            }
        } else {
            let value = instance
                .input_values()
                .get(&field.label)
                .map(Value::display_string)
                .unwrap_or_default();
            match instance.errors().get(&field.label).filter(|m| !m.is_empty()) {
                Some(message) => println!("  {} = {}  [{}]", field.label, value, message),
                None => println!("  {} = {}", field.label, value),
            }
        }
    }
}

fn instance_json(instance: &FormInstance) -> serde_json::Value {
    let values: serde_json::Map<String, serde_json::Value> = instance
        .combined_values()
        .iter()
        .map(|(label, value)| (label.clone(), value.to_json()))
        .collect();
    let failures: serde_json::Map<String, serde_json::Value> = instance
        .formula_failures()
        .iter()
        .map(|(label, message)| (label.clone(), serde_json::json!(message)))
        .collect();
    serde_json::json!({
        "id": instance.schema().id,
        "name": instance.schema().name,
        "values": values,
        "errors": nonempty_errors(instance),
        "failures": failures,
    })
}

/// Error map for machine output; fields that passed are dropped.
fn nonempty_errors(instance: &FormInstance) -> serde_json::Map<String, serde_json::Value> {
    instance
        .errors()
        .iter()
        .filter(|(_, message)| !message.is_empty())
        .map(|(label, message)| (label.clone(), serde_json::json!(message)))
        .collect()
}
