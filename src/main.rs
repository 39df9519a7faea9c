use std::path::{Path, PathBuf};
use std::sync::Arc;

use agepop_tools::config::{AgeColumnRules, DashboardConfig, SourceEncoding};
use agepop_tools::dashboard::{self, Dashboard, PreparedTable};
use agepop_tools::io::excel_write;
use agepop_tools::{ChartKind, DashboardError, Result, Source, load_table};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| DashboardError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.options.resolve_config()?;
    match cli.command {
        Command::Regions(args) => {
            let prepared = open(config, &args.input)?;
            for key in &prepared.region_keys {
                println!("{key}");
            }
            Ok(())
        }
        Command::Columns(args) => {
            let prepared = open(config, &args.input)?;
            for column in &prepared.age_columns {
                println!("{}\t{}", column.age, column.name);
            }
            Ok(())
        }
        Command::Preview(args) => {
            ensure_exists(&args.input.input)?;
            let table = load_table(&Source::Path(args.input.input.clone()), &config)?;
            let (headers, rows) = table.preview(args.rows);
            println!("{}", headers.join("\t"));
            for row in rows {
                println!("{}", row.cells.join("\t"));
            }
            Ok(())
        }
        Command::Chart(args) => execute_chart(config, args),
    }
}

fn open(config: DashboardConfig, input: &Path) -> Result<Arc<PreparedTable>> {
    ensure_exists(input)?;
    let mut session = Dashboard::new(config);
    session.load(&Source::Path(input.to_path_buf()))
}

fn ensure_exists(input: &Path) -> Result<()> {
    if input.exists() {
        Ok(())
    } else {
        Err(DashboardError::MissingInput(input.to_path_buf()))
    }
}

fn execute_chart(config: DashboardConfig, args: ChartArgs) -> Result<()> {
    ensure_exists(&args.input)?;
    let kind = ChartKind::from(args.kind);
    if matches!((args.format, &args.output), (OutputFormat::Xlsx, None)) {
        return Err(DashboardError::InvalidConfig(
            "--output is required for xlsx output".into(),
        ));
    }

    let (series, chart) = dashboard::render_file(config, &args.input, &args.region, kind)?;
    match (args.format, &args.output) {
        (OutputFormat::Json, Some(output)) => {
            std::fs::write(output, dashboard::chart_json(&chart)?)?
        }
        (OutputFormat::Json, None) => println!("{}", dashboard::chart_json(&chart)?),
        (OutputFormat::Xlsx, Some(output)) => {
            excel_write::write_chart_workbook(output, &chart, &series)?
        }
        (OutputFormat::Xlsx, None) => {}
    }
    // Printed after stdout JSON, separated by a blank line.
    if args.with_table {
        if args.output.is_none() {
            println!();
        }
        print!("{}", series.to_tsv());
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Resolve, aggregate, and chart population-by-age tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: GlobalOptions,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Args)]
struct GlobalOptions {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Text encoding of delimited input.
    #[arg(long, value_enum, global = true)]
    encoding: Option<EncodingArg>,

    /// Header of the administrative-region column.
    #[arg(long, global = true)]
    region_column: Option<String>,

    /// Accept age columns of every category, not only totals.
    #[arg(long, global = true)]
    lenient: bool,
}

impl GlobalOptions {
    fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(encoding) = self.encoding {
            config.encoding = encoding.into();
        }
        if let Some(column) = &self.region_column {
            config.region_column = column.clone();
        }
        if self.lenient {
            config.age_rules = AgeColumnRules {
                category_marker: None,
                ..config.age_rules
            };
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the region keys of a table.
    Regions(InputArgs),
    /// List the resolved age columns of a table.
    Columns(InputArgs),
    /// Print the header and the first rows of a table.
    Preview(PreviewArgs),
    /// Aggregate selected regions and emit chart data.
    Chart(ChartArgs),
}

#[derive(clap::Args)]
struct InputArgs {
    /// Input table (CSV or xlsx).
    #[arg(long)]
    input: PathBuf,
}

#[derive(clap::Args)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Number of rows to print.
    #[arg(long, default_value_t = 10)]
    rows: usize,
}

#[derive(clap::Args)]
struct ChartArgs {
    /// Input table (CSV or xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Region key to include; repeat for several regions.
    #[arg(long, required = true)]
    region: Vec<String>,

    /// Chart kind.
    #[arg(long, value_enum, default_value_t = ChartKindArg::Line)]
    kind: ChartKindArg,

    /// Output representation.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output file path; JSON goes to stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also print the aggregated age-by-region table, tab-separated.
    #[arg(long)]
    with_table: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ChartKindArg {
    Line,
    Bar,
}

impl From<ChartKindArg> for ChartKind {
    fn from(kind: ChartKindArg) -> Self {
        match kind {
            ChartKindArg::Line => ChartKind::Line,
            ChartKindArg::Bar => ChartKind::Bar,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Xlsx,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EncodingArg {
    Auto,
    Utf8,
    EucKr,
    Cp949,
}

impl From<EncodingArg> for SourceEncoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Auto => SourceEncoding::Auto,
            EncodingArg::Utf8 => SourceEncoding::Utf8,
            EncodingArg::EucKr => SourceEncoding::EucKr,
            EncodingArg::Cp949 => SourceEncoding::Cp949,
        }
    }
}
