mod preview;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use formwork_core::{validate_schema, FieldDefinition, FormSchema, SchemaError};
use formwork_eval::{evaluate_formula, sample_value, EvalContext, Value};
use formwork_storage::{JsonFileStore, SchemaStore};
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Formwork form-definition toolkit.
#[derive(Parser)]
#[command(name = "formwork", version, about = "Formwork form-definition toolkit")]
struct Cli {
    /// Path to the schema store file
    #[arg(long, global = true, default_value = "formwork.json")]
    store: PathBuf,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema definition file
    Check {
        /// Path to the schema JSON file: {"name": ..., "fields": [...]}
        file: PathBuf,
    },

    /// Validate a schema definition file and save it to the store
    Save {
        /// Path to the schema JSON file
        file: PathBuf,
    },

    /// List saved schemas
    List,

    /// Delete a saved schema by id
    Delete {
        /// Schema id, as printed by save and list
        id: String,
    },

    /// Fill a saved schema and show derived values and validation
    Preview {
        /// Schema id, as printed by save and list
        id: String,
        /// Path to a JSON file of field label -> input value
        #[arg(long)]
        values: Option<PathBuf>,
        /// Attempt the gated submit after applying values
        #[arg(long)]
        submit: bool,
        /// Evaluation date as yyyy-mm-dd (affects computeAge; defaults to today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Evaluate one formula against parent values
    Eval {
        /// Formula text, e.g. "sum(parents['A'], parents['B'])"
        formula: String,
        /// Path to a JSON file of parent label -> value
        #[arg(long)]
        parents: Option<PathBuf>,
        /// Schema file whose field types supply sample parent values
        #[arg(long, value_name = "FILE", requires = "field", conflicts_with = "parents")]
        sample_schema: Option<PathBuf>,
        /// Derived-field label in --sample-schema whose parents to sample
        #[arg(long, requires = "sample_schema")]
        field: Option<String>,
        /// Evaluation date as yyyy-mm-dd (affects computeAge; defaults to today)
        #[arg(long)]
        today: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            cmd_check(&file, cli.output, cli.quiet);
        }
        Commands::Save { file } => {
            cmd_save(&file, &cli.store, cli.output, cli.quiet);
        }
        Commands::List => {
            cmd_list(&cli.store, cli.output, cli.quiet);
        }
        Commands::Delete { id } => {
            cmd_delete(&id, &cli.store, cli.output, cli.quiet);
        }
        Commands::Preview {
            id,
            values,
            submit,
            today,
        } => {
            preview::cmd_preview(
                &id,
                values.as_deref(),
                submit,
                today.as_deref(),
                &cli.store,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Eval {
            formula,
            parents,
            sample_schema,
            field,
            today,
        } => {
            cmd_eval(
                &formula,
                parents.as_deref(),
                sample_schema.as_deref(),
                field.as_deref(),
                today.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Authoring-side schema file: `{"name": ..., "fields": [...]}`.
/// Documents copied out of a store also parse; their id and createdAt
/// are ignored and re-stamped on save.
#[derive(Deserialize)]
struct SchemaDraft {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDefinition>,
}

impl SchemaDraft {
    /// An unsaved schema has no identity yet; validation does not read it.
    fn into_schema(self) -> FormSchema {
        FormSchema {
            id: String::new(),
            name: self.name,
            created_at: String::new(),
            fields: self.fields,
        }
    }
}

fn load_draft(path: &Path, output: OutputFormat, quiet: bool) -> SchemaDraft {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(draft) => draft,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let draft = load_draft(file, output, quiet);
    let schema = draft.into_schema();

    if let Err(e) = validate_schema(&schema) {
        report_schema_error(&e, output, quiet);
        process::exit(1);
    }

    let derived = schema.fields.iter().filter(|f| f.is_derived).count();
    if !quiet {
        match output {
            OutputFormat::Text => {
                println!(
                    "valid: {} field(s), {} derived",
                    schema.fields.len(),
                    derived
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": true,
                    "fields": schema.fields.len(),
                    "derived": derived,
                });
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
        }
    }
}

fn cmd_save(file: &Path, store_path: &Path, output: OutputFormat, quiet: bool) {
    let draft = load_draft(file, output, quiet);
    let schema = FormSchema::with_identity(draft.name, draft.fields);

    if let Err(e) = validate_schema(&schema) {
        report_schema_error(&e, output, quiet);
        process::exit(1);
    }

    let store = JsonFileStore::new(store_path);
    if let Err(e) = store.persist(&schema) {
        report_error(&format!("{}", e), output, quiet);
        process::exit(1);
    }

    if !quiet {
        match output {
            OutputFormat::Text => {
                println!("saved '{}' as {}", schema.name, schema.id);
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "id": schema.id,
                    "name": schema.name,
                    "createdAt": schema.created_at,
                });
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
        }
    }
}

fn cmd_list(store_path: &Path, output: OutputFormat, quiet: bool) {
    let store = JsonFileStore::new(store_path);
    let schemas = match store.load_all() {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("{}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            if schemas.is_empty() {
                println!("no saved schemas");
            } else {
                for schema in &schemas {
                    println!(
                        "{}  {}  {} field(s)  created {}",
                        schema.id,
                        schema.name,
                        schema.fields.len(),
                        schema.created_at
                    );
                }
            }
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = schemas
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id,
                        "name": s.name,
                        "createdAt": s.created_at,
                        "fields": s.fields.len(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Array(rows)).unwrap_or_default()
            );
        }
    }
}

fn cmd_delete(id: &str, store_path: &Path, output: OutputFormat, quiet: bool) {
    let store = JsonFileStore::new(store_path);
    if let Err(e) = store.delete_by_id(id) {
        report_error(&format!("{}", e), output, quiet);
        process::exit(1);
    }
    if !quiet {
        match output {
            OutputFormat::Text => println!("deleted {}", id),
            OutputFormat::Json => println!("{{\"deleted\": \"{}\"}}", id),
        }
    }
}

fn cmd_eval(
    formula: &str,
    parents_path: Option<&Path>,
    sample_schema: Option<&Path>,
    field: Option<&str>,
    today: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let ctx = eval_context(today, output, quiet);

    let parents = if let Some(path) = parents_path {
        read_values_file(path, output, quiet)
    } else if let (Some(path), Some(label)) = (sample_schema, field) {
        sample_parents(path, label, &ctx, output, quiet)
    } else {
        BTreeMap::new()
    };

    match evaluate_formula(formula, &parents, &ctx) {
        Ok(value) => {
            if !quiet {
                match output {
                    OutputFormat::Text => println!("{}", value.display_string()),
                    OutputFormat::Json => {
                        let json = serde_json::json!({
                            "value": value.to_json(),
                            "display": value.display_string(),
                        });
                        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
                    }
                }
            }
        }
        Err(e) => {
            report_error(&format!("{}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Type-aware sample values for a derived field's declared parents, so a
/// formula can be previewed before the form has real inputs.
fn sample_parents(
    path: &Path,
    label: &str,
    ctx: &EvalContext,
    output: OutputFormat,
    quiet: bool,
) -> BTreeMap<String, Value> {
    let schema = load_draft(path, output, quiet).into_schema();
    let field = match schema.field(label) {
        Some(f) if f.is_derived => f,
        Some(_) => {
            let msg = format!("'{}' is not a derived field in '{}'", label, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
        None => {
            let msg = format!("no field labeled '{}' in '{}'", label, path.display());
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    field
        .derived_from
        .iter()
        .map(|parent| {
            let value = match schema.field(parent) {
                Some(p) => sample_value(p.field_type, ctx.today),
                None => Value::Text(String::new()),
            };
            (parent.clone(), value)
        })
        .collect()
}

/// Read a JSON object of label -> value into evaluator values.
pub(crate) fn read_values_file(
    path: &Path,
    output: OutputFormat,
    quiet: bool,
) -> BTreeMap<String, Value> {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let json: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    match json {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(label, v)| (label, Value::from_json(&v)))
            .collect(),
        _ => {
            let msg = format!(
                "expected a JSON object of label -> value in '{}'",
                path.display()
            );
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Calendar dates on the command line are exchanged as `yyyy-mm-dd`.
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) fn eval_context(today: Option<&str>, output: OutputFormat, quiet: bool) -> EvalContext {
    match today {
        None => EvalContext::default(),
        Some(text) => match Date::parse(text, DATE_FORMAT) {
            Ok(date) => EvalContext::at(date),
            Err(_) => {
                let msg = format!("invalid --today date '{}': expected yyyy-mm-dd", text);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
    }
}

fn report_schema_error(e: &SchemaError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{:?}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                let place = match (&e.label, e.column) {
                    (Some(label), Some(col)) => format!(" in field '{}' (column {})", label, col),
                    (Some(label), None) => format!(" in field '{}'", label),
                    (None, Some(col)) => format!(" (column {})", col),
                    (None, None) => String::new(),
                };
                eprintln!("schema error{}: {}", place, e.message);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
