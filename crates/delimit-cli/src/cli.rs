//! CLI argument definitions for the delimited-text reader.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "delimit",
    version,
    about = "Read delimited text files and report what was recovered",
    long_about = "Read CSV, TSV, and other delimited text files.\n\n\
                  Malformed rows are padded, joined, or realigned where possible, \
                  and every recovered problem is listed as a warning."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the records of a file followed by the warnings raised.
    Rows(RowsArgs),

    /// Print the resolved schema of a file without reading records.
    Schema(SchemaArgs),
}

#[derive(Parser)]
pub struct RowsArgs {
    #[command(flatten)]
    pub reader: ReaderArgs,

    /// Stop after this many records.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<u64>,

    /// Output format for the records.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Text shown for null values in table output.
    #[arg(long = "null-text", value_name = "TEXT", default_value = "")]
    pub null_text: String,
}

#[derive(Parser)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub reader: ReaderArgs,
}

/// Options shared by every command that opens a file.
#[derive(Args, Default)]
pub struct ReaderArgs {
    /// Delimited text file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file with reader options; flags below override it.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON file with column definitions.
    #[arg(long = "columns", value_name = "PATH")]
    pub columns: Option<PathBuf>,

    /// Text encoding label (utf-8, windows-1252, latin1, ...).
    #[arg(long = "encoding", default_value = "utf-8")]
    pub encoding: String,

    /// Field delimiter; accepts `tab` or `\t` for tabs.
    #[arg(short = 'd', long = "delimiter", value_parser = parse_char)]
    pub delimiter: Option<char>,

    /// Quote character.
    #[arg(long = "qualifier", value_parser = parse_char, conflicts_with = "no_qualifier")]
    pub qualifier: Option<char>,

    /// Disable quoting entirely.
    #[arg(long = "no-qualifier")]
    pub no_qualifier: bool,

    /// Escape prefix that makes the next character literal.
    #[arg(long = "escape", value_parser = parse_char)]
    pub escape: Option<char>,

    /// Lines starting with this text are skipped.
    #[arg(long = "comment", value_name = "PREFIX")]
    pub comment: Option<String>,

    /// The first row is data; columns are named Column1..N.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Which fields get surrounding whitespace removed.
    #[arg(long = "trim", value_enum)]
    pub trim: Option<TrimArg>,

    /// Join short rows with the following line.
    #[arg(long = "combine-rows")]
    pub combine_rows: bool,

    /// Realign rows with too many columns.
    #[arg(long = "realign")]
    pub realign: bool,

    /// Physical lines skipped before the header.
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,

    /// Field text read as null.
    #[arg(long = "treat-as-null", value_name = "TEXT")]
    pub treat_as_null: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum TrimArg {
    None,
    Unquoted,
    All,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Parses a single character argument, with names for characters that are
/// awkward to pass on a shell.
pub fn parse_char(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\\t" => return Ok('\t'),
        "space" => return Ok(' '),
        "pipe" => return Ok('|'),
        "semicolon" => return Ok(';'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(format!("expected a single character, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_characters() {
        assert_eq!(parse_char("tab"), Ok('\t'));
        assert_eq!(parse_char("\\t"), Ok('\t'));
        assert_eq!(parse_char(";"), Ok(';'));
        assert!(parse_char("ab").is_err());
        assert!(parse_char("").is_err());
    }

    #[test]
    fn parses_rows_command() {
        let cli = Cli::try_parse_from([
            "delimit",
            "rows",
            "data.txt",
            "-d",
            "tab",
            "--no-header",
            "--trim",
            "all",
            "--limit",
            "5",
        ])
        .expect("parse");
        let Command::Rows(args) = cli.command else {
            panic!("expected rows command");
        };
        assert_eq!(args.reader.delimiter, Some('\t'));
        assert!(args.reader.no_header);
        assert_eq!(args.reader.trim, Some(TrimArg::All));
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn qualifier_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "delimit",
            "schema",
            "data.csv",
            "--qualifier",
            "'",
            "--no-qualifier",
        ]);
        assert!(parsed.is_err());
    }
}
