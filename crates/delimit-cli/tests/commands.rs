//! End-to-end command runs over files on disk.

use std::fs;
use std::path::Path;

use clap::Parser;
use delimit_cli::cli::{Cli, Command};
use delimit_cli::commands::{run_rows, run_schema};
use delimit_cli::summary::{rows_table, schema_table};
use delimit_model::{DataType, Value, WarningKind};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("write file");
    path_arg(&path)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["delimit"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse").command
}

#[test]
fn rows_with_typed_columns_and_warnings() {
    let dir = TempDir::new().expect("temp dir");
    let data = write(&dir, "orders.csv", "Id;Qty;Note\n1;5;ok\n2;x\n3;7;fine\n");
    let columns = write(
        &dir,
        "columns.json",
        r#"[{"name": "Qty", "value_format": {"data_type": "Integer"}}]"#,
    );
    let Command::Rows(args) = parse(&["rows", &data, "-d", ";", "--columns", &columns]) else {
        panic!("expected rows command");
    };
    let result = run_rows(&args).expect("rows");

    assert_eq!(result.table.len(), 3);
    assert_eq!(result.table.get(0, "Qty"), Some(&Value::Integer(5)));
    assert_eq!(result.table.get(1, "Qty"), Some(&Value::Null));
    assert_eq!(result.table.get(1, "Note"), Some(&Value::Null));
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::RowShape && w.record_number == 2)
    );
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Conversion && w.message.contains("'x'"))
    );
    assert!(rows_table(&result, "").to_string().contains("fine"));
}

#[test]
fn rows_limit_and_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let data = write(&dir, "data.txt", "# export\nA|B\n1|2\n3|4\n5|6\n");
    let config = write(
        &dir,
        "options.json",
        r##"{"delimiter": "|", "comment_prefix": "#"}"##,
    );
    let Command::Rows(args) = parse(&["rows", &data, "--config", &config, "--limit", "2"]) else {
        panic!("expected rows command");
    };
    let result = run_rows(&args).expect("rows");
    assert_eq!(result.table.len(), 2);
    assert_eq!(
        result.table.column_names().collect::<Vec<_>>(),
        vec!["A", "B"]
    );
    assert_eq!(
        result.table.get(1, "B"),
        Some(&Value::String("4".to_string()))
    );
}

#[test]
fn schema_without_header() {
    let dir = TempDir::new().expect("temp dir");
    let data = write(&dir, "plain.csv", "x,y,z\n");
    let Command::Schema(args) = parse(&["schema", &data, "--no-header"]) else {
        panic!("expected schema command");
    };
    let result = run_schema(&args).expect("schema");
    let names: Vec<&str> = result
        .description
        .columns
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(names, vec!["Column1", "Column2", "Column3"]);
    assert!(
        result
            .description
            .columns
            .iter()
            .all(|column| column.data_type == DataType::String)
    );
    assert!(schema_table(&result.description).to_string().contains("Column2"));
}

#[test]
fn missing_file_reports_context() {
    let dir = TempDir::new().expect("temp dir");
    let missing = path_arg(&dir.path().join("absent.csv"));
    let Command::Schema(args) = parse(&["schema", &missing]) else {
        panic!("expected schema command");
    };
    let error = run_schema(&args).expect_err("missing file");
    assert!(format!("{error:#}").contains("absent.csv"));
}

#[test]
fn unknown_encoding_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let data = write(&dir, "data.csv", "A\n1\n");
    let Command::Rows(args) = parse(&["rows", &data, "--encoding", "klingon"]) else {
        panic!("expected rows command");
    };
    let error = run_rows(&args).expect_err("bad encoding");
    assert!(format!("{error:#}").contains("klingon"));
}
