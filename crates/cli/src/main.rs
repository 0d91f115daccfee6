//! `acasalamento` - build breeding-plan PDF reports from CSV exports

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use herd_data::{Dataset, TextEncoding};
use report::{
    capacity_table, generate_report, suggested_file_name, CoverTemplate, Orientation,
    ReportAssets, ReportConfig, MAX_FONT_SIZE, MIN_FONT_SIZE,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "acasalamento",
    version,
    about = "Gera relatórios PDF de acasalamento a partir de CSV"
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the PDF report for a CSV file
    Generate(GenerateArgs),
    /// List the relabeled columns of a CSV file
    Columns(ColumnsArgs),
    /// Show how many rows fit per page for each font size
    Capacity {
        #[arg(long, default_value_t = Orientation::Landscape)]
        orientation: Orientation,
    },
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// CSV export to read
    csv: PathBuf,

    /// Output PDF (default: acasalamento_<cliente>_<data>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    client: Option<String>,

    #[arg(long)]
    header_left: Option<String>,

    #[arg(long)]
    header_right: Option<String>,

    /// Table font size in whole points (6 to 16)
    #[arg(long)]
    font_size: Option<u32>,

    #[arg(long)]
    rows_per_page: Option<usize>,

    #[arg(long)]
    orientation: Option<Orientation>,

    /// Empresarial, Técnico or Executivo
    #[arg(long)]
    template: Option<CoverTemplate>,

    /// Comma-separated column labels, in display order
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    #[arg(long)]
    logo: Option<PathBuf>,

    #[arg(long)]
    brand_logo: Option<PathBuf>,

    #[arg(long)]
    watermark: Option<String>,

    #[arg(long)]
    responsible: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Leave the last page short instead of filling it with blank rows
    #[arg(long)]
    no_pad: bool,

    #[arg(long)]
    no_zebra: bool,

    /// TrueType font used instead of Helvetica
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long)]
    bold_font: Option<PathBuf>,

    #[command(flatten)]
    csv_format: CsvFormatArgs,
}

#[derive(Args, Debug)]
struct ColumnsArgs {
    csv: PathBuf,

    /// JSON configuration (for columnLabels, encoding and delimiter)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    csv_format: CsvFormatArgs,
}

#[derive(Args, Debug, Default)]
struct CsvFormatArgs {
    /// utf8, latin1 or auto
    #[arg(long)]
    encoding: Option<TextEncoding>,

    /// Field separator (detected from the header line when omitted)
    #[arg(long)]
    delimiter: Option<char>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate(args) => {
            let output = generate(args)?;
            println!("{}", output.display());
        }
        Command::Columns(args) => {
            let dataset = load_columns(&args)?;
            println!("{} linhas", dataset.len());
            for (i, header) in dataset.headers().iter().enumerate() {
                println!("{i:>3}  {header}");
            }
        }
        Command::Capacity { orientation } => {
            println!("Fonte  Linhas/página ({orientation})");
            for (size, rows) in capacity_table(MIN_FONT_SIZE..=MAX_FONT_SIZE, orientation) {
                println!("{size:>5}  {rows:>6}");
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ReportConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))
        }
        None => Ok(ReportConfig::default()),
    }
}

impl CsvFormatArgs {
    fn apply(&self, config: &mut ReportConfig) {
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if self.delimiter.is_some() {
            config.delimiter = self.delimiter;
        }
    }
}

impl GenerateArgs {
    /// Command-line values win over the JSON file
    fn apply(self, config: &mut ReportConfig) {
        self.csv_format.apply(config);
        if let Some(client) = self.client {
            config.client_name = client;
        }
        if let Some(text) = self.header_left {
            config.header_left_text = text;
        }
        if self.header_right.is_some() {
            config.header_right_text = self.header_right;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if self.rows_per_page.is_some() {
            config.rows_per_page = self.rows_per_page;
        }
        if let Some(orientation) = self.orientation {
            config.orientation = orientation;
        }
        if let Some(template) = self.template {
            config.cover_template = template;
        }
        if self.columns.is_some() {
            config.selected_columns = self.columns;
        }
        if self.logo.is_some() {
            config.logo_image_path = self.logo;
        }
        if self.brand_logo.is_some() {
            config.brand_logo_path = self.brand_logo;
        }
        if self.watermark.is_some() {
            config.watermark_text = self.watermark;
        }
        if let Some(name) = self.responsible {
            config.responsible_name = name;
        }
        if let Some(phone) = self.phone {
            config.contact_phone = phone;
        }
        if self.no_pad {
            config.pad_last_page = false;
        }
        if self.no_zebra {
            config.zebra_rows = false;
        }
        if self.font.is_some() {
            config.font_path = self.font;
        }
        if self.bold_font.is_some() {
            config.bold_font_path = self.bold_font;
        }
    }
}

/// Write the report and return where it went
fn generate(args: GenerateArgs) -> Result<PathBuf> {
    let mut config = load_config(args.config.as_deref())?;
    let csv = args.csv.clone();
    let output = args.output.clone();
    args.apply(&mut config);
    config.validate().context("invalid report options")?;

    let dataset = Dataset::from_path(&csv, &config.csv_options())
        .with_context(|| format!("failed to load {}", csv.display()))?;
    let assets = ReportAssets::load(&config)?;
    let pdf = generate_report(&dataset, &config, &assets).context("failed to generate report")?;

    let output = output.unwrap_or_else(|| {
        PathBuf::from(suggested_file_name(&config.client_name, Local::now().naive_local()))
    });
    std::fs::write(&output, &pdf)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), bytes = pdf.len(), "report written");
    Ok(output)
}

/// Load the CSV and relabel its headers the way `generate` would
fn load_columns(args: &ColumnsArgs) -> Result<Dataset> {
    let mut config = load_config(args.config.as_deref())?;
    args.csv_format.apply(&mut config);
    let mut dataset = Dataset::from_path(&args.csv, &config.csv_options())
        .with_context(|| format!("failed to load {}", args.csv.display()))?;
    dataset.relabel_headers(&config.relabeler())?;
    Ok(dataset)
}
