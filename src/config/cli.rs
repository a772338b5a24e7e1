use crate::config::file::{FileConfig, LogFormat};
use crate::config::{ClientConfig, Environment};
use crate::core::Storage;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "regenerapp")]
#[command(about = "Command-line client for the RegenerApp project backend")]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend preset
    #[arg(long, value_enum, global = true)]
    pub env: Option<Environment>,

    /// Backend base URL, overrides the preset
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory for exported archives
    #[arg(long, global = true)]
    pub output: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List projects, optionally filtered locally
    Projects {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        project_type: Option<String>,
        #[arg(long)]
        phase: Option<String>,
    },
    /// Select the working project
    Select { id: i64 },
    /// Show the selected project
    Selected,
    /// Move a project to its next phase
    AdvancePhase { id: i64 },
    /// Project dashboard with the financial summary
    Dashboard { project: i64 },
    /// Material catalogue
    Materials {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        category_type: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Supplier directory
    Suppliers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        supplier_type: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        preferred: bool,
        /// Suppliers grouped by material category type
        #[arg(long)]
        category_type: Option<String>,
    },
    /// Supplier offers for a material, cheapest first
    Prices { material: i64 },
    /// Initial budget items
    #[command(subcommand)]
    Budget(BudgetCommand),
    /// Real expenses
    #[command(subcommand)]
    Expense(ExpenseCommand),
    /// Financial summary of a project, or of the selected one
    Summary {
        #[arg(long)]
        project: Option<i64>,
        /// Recompute the selected project's summary first
        #[arg(long)]
        refresh: bool,
    },
    /// Material calculators
    #[command(subcommand)]
    Calc(CalcCommand),
    /// Write the budget tables of a project to a zip archive
    Export { project: i64 },
    /// Backend health check
    Health,
    /// Public settings exposed by the backend
    ServerConfig,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    /// Existing id; updates instead of creating
    #[arg(long)]
    pub id: Option<i64>,
    #[arg(long)]
    pub project: i64,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub quantity: f64,
    #[arg(long, default_value = "unidad")]
    pub unit: String,
    #[arg(long)]
    pub unit_price: f64,
    #[arg(long, default_value = "")]
    pub spaces: String,
    #[arg(long)]
    pub material: Option<i64>,
    #[arg(long)]
    pub supplier: Option<i64>,
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCommand {
    List {
        project: i64,
        #[arg(long)]
        category: Option<String>,
    },
    /// Create or update an item
    Save {
        #[command(flatten)]
        line: LineArgs,
        /// Fraction (0..1) or fixed amount (>1), shown in the total preview
        #[arg(long)]
        discount: Option<f64>,
    },
    Delete { id: i64 },
    /// Copy one item into the real expenses
    Copy {
        id: i64,
        #[arg(long)]
        date: String,
        #[arg(long)]
        supplier: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Copy several items into the real expenses
    CopyMany {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        #[arg(long)]
        date: String,
        #[arg(long)]
        supplier: Option<i64>,
    },
    /// Totals per category
    Rollup { project: i64 },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    List {
        project: i64,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Create or update an expense
    Save {
        #[command(flatten)]
        line: LineArgs,
        #[arg(long)]
        discount_percentage: Option<f64>,
        #[arg(long)]
        discount_amount: Option<f64>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        invoice: String,
        #[arg(long, default_value = "")]
        payment_method: String,
        #[arg(long)]
        budget_item: Option<i64>,
    },
    Delete { id: i64 },
    Rollup { project: i64 },
}

#[derive(Debug, Subcommand)]
pub enum CalcCommand {
    /// Calculators registered on the backend
    Types,
    /// Fields of a calculator
    Form { kind: String },
    /// Run a calculator with `--set key=value` inputs
    Run {
        kind: String,
        #[arg(long)]
        project: i64,
        #[arg(long)]
        material: Option<i64>,
        #[arg(long = "set", value_parser = parse_key_val)]
        inputs: Vec<(String, String)>,
    },
    /// Suggested materials for a calculator
    Materials { kind: String },
    /// Turn a calculation into a budget item
    AddToBudget {
        calculation: i64,
        #[arg(long)]
        supplier: Option<i64>,
        #[arg(long)]
        unit_price: Option<f64>,
        #[arg(long)]
        spaces: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Previous calculations
    History {
        #[arg(long)]
        project: Option<i64>,
    },
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Environment variables, then the TOML file, then flags.
    pub fn resolve(&self) -> Result<(ClientConfig, LogFormat)> {
        let mut config = ClientConfig::from_env()?;
        let mut format = LogFormat::Compact;

        if let Some(path) = &self.config {
            let file = FileConfig::from_file(path)?;
            config = file.apply(config);
            format = file.logging.format;
        }
        if let Some(environment) = self.env {
            config.base_url = environment.base_url().to_string();
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if self.json_logs {
            format = LogFormat::Json;
        }
        Ok((config, format))
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        Ok(fs::read(full_path)?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("area_to_paint=25,5").unwrap(),
            ("area_to_paint".to_string(), "25,5".to_string())
        );
        assert!(parse_key_val("area").is_err());
        assert!(parse_key_val("=3").is_err());
    }

    #[test]
    fn test_calc_run_arguments() {
        let cli = Cli::try_parse_from([
            "regenerapp",
            "calc",
            "run",
            "pintura",
            "--project",
            "3",
            "--set",
            "area_to_paint=25",
            "--set",
            "paint_type=latex",
        ])
        .unwrap();
        match cli.command {
            Command::Calc(CalcCommand::Run { kind, project, inputs, material }) => {
                assert_eq!(kind, "pintura");
                assert_eq!(project, 3);
                assert_eq!(material, None);
                assert_eq!(inputs.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nenvironment = \"production\"\n\n[export]\noutput_path = \"./exports\"\n")
            .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["regenerapp", "--config", &path, "health"]).unwrap();
        let (config, format) = cli.resolve().unwrap();
        assert_eq!(config.output_path, "./exports");
        assert_eq!(format, LogFormat::Compact);

        let cli = Cli::try_parse_from([
            "regenerapp",
            "--config",
            &path,
            "--base-url",
            "http://localhost:8000/api",
            "--json-logs",
            "health",
        ])
        .unwrap();
        let (config, format) = cli.resolve().unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/api/");
        assert_eq!(format, LogFormat::Json);
    }

    #[tokio::test]
    async fn test_local_storage_creates_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());

        storage.write_file("exports/a.zip", b"data").await.unwrap();
        assert_eq!(storage.read_file("exports/a.zip").await.unwrap(), b"data");
        assert!(storage.read_file("missing.zip").await.is_err());
    }
}
