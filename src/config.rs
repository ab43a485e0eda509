//! Application configuration: command-line arguments and an optional
//! YAML/JSON configuration file. Command-line values win over file values.

use crate::domain::entities::{ExportSettings, LineTerminator, DEFAULT_BATCH_SIZE};
use crate::domain::errors::{ExportError, Result};
use crate::infrastructure::oracle::connection::Logon;
use clap::{ArgGroup, Parser};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// `{<username>[/<password>][@<connect_identifier>] | /}`
    pub logon: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
    pub schemas: Option<Vec<String>>,
    pub tables: Option<Vec<String>>,
    pub tables_file: Option<String>,
    pub sql: Option<String>,
    /// File holding the statement; `-` reads it from stdin.
    pub sql_file: Option<String>,
    pub exclude_columns: Vec<String>,
    pub scn: Option<u64>,
    pub null_as: Option<String>,
    pub array_size: usize,
    pub header: bool,
    pub line_terminator: LineTerminator,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            schemas: None,
            tables: None,
            tables_file: None,
            sql: None,
            sql_file: None,
            exclude_columns: Vec::new(),
            scn: None,
            null_as: None,
            array_size: DEFAULT_BATCH_SIZE,
            header: true,
            line_terminator: LineTerminator::Lf,
        }
    }
}

/// What to export, resolved from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    Schemas(Vec<String>),
    Tables(Vec<String>),
    /// Ad-hoc statement; output goes to stdout.
    Sql(String),
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "CSV Exporter for Oracle", long_about = None)]
#[command(group(ArgGroup::new("source").args(["schema", "table", "table_list", "sql", "file"])))]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Schema to export; every table is written to <OUTPUT>/<OWNER>.<TABLE>.csv. Repeatable
    #[arg(short, long = "schema", value_name = "SCHEMA")]
    pub schema: Vec<String>,

    /// Table to export, as TABLE or SCHEMA.TABLE. Repeatable
    #[arg(short, long = "table", value_name = "TABLE")]
    pub table: Vec<String>,

    /// File containing the list of tables to export, one per line
    #[arg(short = 'l', long, value_name = "FILENAME")]
    pub table_list: Option<String>,

    /// SQL statement to execute; CSV is printed to stdout
    #[arg(long)]
    pub sql: Option<String>,

    /// File to read the SQL statement from; '-' reads stdin
    #[arg(short, long)]
    pub file: Option<String>,

    /// Directory to write CSV and binary files to
    #[arg(short = 'p', long)]
    pub output_path: Option<String>,

    /// Column to exclude, qualified like the table (TAB.COL or SCHEMA.TAB.COL). Repeatable
    #[arg(short = 'x', long = "exclude-column", value_name = "COLUMN")]
    pub exclude_column: Vec<String>,

    /// Export data AS OF this System Change Number
    #[arg(long)]
    pub scn: Option<u64>,

    /// Text written for NULL values (default: empty field). For MySQL use '\N'
    #[arg(long, value_name = "NULL_AS")]
    pub null_as: Option<String>,

    /// Rows fetched per round-trip
    #[arg(long)]
    pub array_size: Option<usize>,

    /// Omit the header row with column names
    #[arg(long)]
    pub no_header: bool,

    /// Use DOS line endings (\r\n)
    #[arg(long)]
    pub crlf: bool,

    /// {<username>[/<password>][@<connect_identifier>] | /}
    pub oracle_logon: Option<String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents).map_err(|e| ExportError::ConfigError(e.to_string()))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ExportError::ConfigError(e.to_string()))?
        };

        Ok(config)
    }

    /// Loads the file named by `--config` if any, then applies CLI overrides.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_cli(args);
        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(l) = &args.oracle_logon { self.database.logon = Some(l.clone()); }
        if let Some(o) = &args.output_path { self.export.output_dir = o.clone(); }
        if let Some(n) = &args.null_as { self.export.null_as = Some(n.clone()); }
        if let Some(a) = args.array_size { self.export.array_size = a; }
        if let Some(s) = args.scn { self.export.scn = Some(s); }
        if args.no_header { self.export.header = false; }
        if args.crlf { self.export.line_terminator = LineTerminator::Crlf; }
        if !args.exclude_column.is_empty() {
            self.export.exclude_columns.extend(args.exclude_column.iter().cloned());
        }

        // A source given on the command line replaces whatever the file had.
        let cli_source = !args.schema.is_empty()
            || !args.table.is_empty()
            || args.table_list.is_some()
            || args.sql.is_some()
            || args.file.is_some();
        if cli_source {
            let e = &mut self.export;
            e.schemas = (!args.schema.is_empty()).then(|| args.schema.clone());
            e.tables = (!args.table.is_empty()).then(|| args.table.clone());
            e.tables_file = args.table_list.clone();
            e.sql = args.sql.clone();
            e.sql_file = args.file.clone();
        }
    }

    /// Checks everything that can be checked before connecting.
    pub fn validate(&self) -> Result<()> {
        if self.export.array_size == 0 {
            return Err(ExportError::ConfigError(
                "array size must be a positive number of rows".to_string(),
            ));
        }
        match &self.database.logon {
            Some(l) => {
                Logon::parse(l)?;
            }
            None => {
                return Err(ExportError::ConfigError(
                    "an Oracle logon is required".to_string(),
                ))
            }
        }

        let e = &self.export;
        let sources = [
            e.schemas.is_some(),
            e.tables.is_some(),
            e.tables_file.is_some(),
            e.sql.is_some(),
            e.sql_file.is_some(),
        ];
        match sources.iter().filter(|s| **s).count() {
            1 => Ok(()),
            0 => Err(ExportError::ConfigError(
                "one of --schema, --table, --table-list, --sql or --file is required".to_string(),
            )),
            _ => Err(ExportError::ConfigError(
                "only one of --schema, --table, --table-list, --sql or --file may be given"
                    .to_string(),
            )),
        }
    }

    pub fn logon(&self) -> Result<Logon> {
        let logon = self.database.logon.as_deref().ok_or_else(|| {
            ExportError::ConfigError("an Oracle logon is required".to_string())
        })?;
        Logon::parse(logon)
    }
}

impl ExportConfig {
    /// The immutable per-run settings handed to the exporter.
    pub fn settings(&self) -> ExportSettings {
        ExportSettings {
            batch_size: self.array_size,
            null_marker: self.null_as.clone().filter(|m| !m.is_empty()),
            line_terminator: self.line_terminator,
            header: self.header,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// Resolves the export source, reading list and statement files.
    pub fn source(&self) -> Result<ExportSource> {
        if let Some(schemas) = &self.schemas {
            return Ok(ExportSource::Schemas(schemas.clone()));
        }
        if let Some(tables) = &self.tables {
            return Ok(ExportSource::Tables(tables.clone()));
        }
        if let Some(path) = &self.tables_file {
            let contents = std::fs::read_to_string(path)?;
            let tables = contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            return Ok(ExportSource::Tables(tables));
        }
        if let Some(sql) = &self.sql {
            return Ok(ExportSource::Sql(sql.clone()));
        }
        if let Some(path) = &self.sql_file {
            let mut sql = String::new();
            if path == "-" {
                std::io::stdin().read_to_string(&mut sql)?;
            } else {
                File::open(path)?.read_to_string(&mut sql)?;
            }
            return Ok(ExportSource::Sql(sql));
        }
        Err(ExportError::ConfigError("nothing to export".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_yaml_config() {
        let yaml = r#"
database:
  logon: "scott/tiger@//localhost:1521/ORCL"
export:
  output_dir: "./output"
  tables: ["SCOTT.EMP", "SCOTT.DEPT"]
  null_as: "\\N"
  line_terminator: crlf
"#;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{}", yaml).unwrap();
        let path = file.path().to_str().unwrap();

        let config = AppConfig::from_file(path).expect("Failed to parse config");
        assert_eq!(config.export.output_dir, "./output");
        assert_eq!(config.export.array_size, 16384);
        assert!(config.export.header);
        config.validate().unwrap();

        let settings = config.export.settings();
        assert_eq!(settings.null_marker.as_deref(), Some("\\N"));
        assert_eq!(settings.line_terminator, LineTerminator::Crlf);
        assert_eq!(
            config.export.source().unwrap(),
            ExportSource::Tables(vec!["SCOTT.EMP".to_string(), "SCOTT.DEPT".to_string()])
        );
    }

    #[test]
    fn test_load_json_config() {
        let json = r#"{"database": {"logon": "/"}, "export": {"sql": "select * from dual", "header": false}}"#;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", json).unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert!(!config.export.settings().header);
        assert_eq!(
            config.export.source().unwrap(),
            ExportSource::Sql("select * from dual".to_string())
        );
    }

    #[test]
    fn test_cli_parsing_and_overrides() {
        let args = CliArgs::try_parse_from([
            "oracle_csv_exporter",
            "-t",
            "EMP",
            "-t",
            "SCOTT.DEPT",
            "--null-as",
            "NULL",
            "--array-size",
            "100",
            "--no-header",
            "--crlf",
            "-x",
            "EMP.SAL",
            "--scn",
            "1234",
            "scott/tiger@ORCL",
        ])
        .unwrap();

        let config = AppConfig::load(&args).unwrap();
        config.validate().unwrap();

        let s = config.export.settings();
        assert_eq!(s.batch_size, 100);
        assert!(!s.header);
        assert_eq!(s.line_terminator, LineTerminator::Crlf);
        assert_eq!(s.null_marker.as_deref(), Some("NULL"));
        assert_eq!(config.export.scn, Some(1234));
        assert_eq!(config.export.exclude_columns, vec!["EMP.SAL".to_string()]);
        assert_eq!(config.logon().unwrap().username, "scott");
    }

    #[test]
    fn test_cli_sources_are_mutually_exclusive() {
        let res = CliArgs::try_parse_from([
            "oracle_csv_exporter",
            "-t",
            "EMP",
            "--sql",
            "select 1 from dual",
            "/",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut config = AppConfig::default();
        config.database.logon = Some("scott/tiger".to_string());
        assert!(config.validate().is_err());

        config.export.tables = Some(vec!["EMP".to_string()]);
        config.validate().unwrap();

        config.export.array_size = 0;
        assert!(config.validate().is_err());

        config.export.array_size = 10;
        config.database.logon = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_list_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "EMP\n\n  SCOTT.DEPT  \n").unwrap();
        let config = ExportConfig {
            tables_file: Some(file.path().to_str().unwrap().to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.source().unwrap(),
            ExportSource::Tables(vec!["EMP".to_string(), "SCOTT.DEPT".to_string()])
        );
    }
}
