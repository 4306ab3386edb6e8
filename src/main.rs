use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use gsync::config::{self, KNOWN_SHEETS};
use gsync::io::FileFormat;
use gsync::manager::SyncManager;
use gsync::remote::{GoogleSheetsClient, SpreadsheetService};
use gsync::sync::{SheetOptions, SyncSheet};
use gsync::{Result, SyncError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| SyncError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync(args) => execute_sync(args),
        Command::Show(args) => execute_show(args),
        Command::List => {
            for (name, id) in KNOWN_SHEETS {
                println!("{name}\t{id}");
            }
            Ok(())
        }
    }
}

fn execute_sync(args: SyncArgs) -> Result<()> {
    let dir = args.target.resolve_dir()?;
    let service = args.auth.connect()?;
    let format = FileFormat::from(args.target.format);

    let mut manager = if args.names.is_empty() {
        SyncManager::from_known_sheets(service, &dir, format)?
    } else {
        let sheets = args
            .names
            .iter()
            .map(|name| {
                let id = config::sheet_id(name)?;
                let options = SheetOptions {
                    path: Some(dir.join(format!("{name}.{format}"))),
                    service: Some(Arc::clone(&service)),
                    ..SheetOptions::default()
                };
                SyncSheet::new(id, name, options)
            })
            .collect::<Result<Vec<_>>>()?;
        SyncManager::new(sheets)
    };

    manager.sync_all(args.force)?;
    for (name, synced) in manager.statuses() {
        println!("{name}: {synced}");
    }
    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<()> {
    let id = config::sheet_id(&args.name)?;
    let dir = args.target.resolve_dir()?;
    let service = args.auth.connect()?;
    let format = FileFormat::from(args.target.format);

    let options = SheetOptions {
        tab: args.tab,
        path: Some(dir.join(format!("{}.{format}", args.name))),
        index_col: if args.no_index {
            None
        } else {
            Some(args.index_col)
        },
        service: Some(service),
    };
    let mut sheet = SyncSheet::new(id, &args.name, options)?;
    sheet.download(args.skip_header, args.force)?;

    let table = sheet.df()?;
    println!("{}", table.columns().join("\t"));
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join("\t"));
    }
    if let Some(index) = table.index_column() {
        println!("Index column: {index}");
    }
    println!("Last update time: {}", sheet.last_update_time().to_rfc3339());
    println!("Synced: {}", sheet.is_synced());
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Mirror remote spreadsheets into local TSV, Excel, or JSON files."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bring local mirrors of the known sheets up to date.
    Sync(SyncArgs),
    /// Sync a single sheet and print its contents.
    Show(ShowArgs),
    /// List the known sheets and their spreadsheet ids.
    List,
}

#[derive(clap::Args)]
struct AuthArgs {
    /// Service account key file.
    #[arg(long, default_value = config::DEFAULT_CREDENTIALS_PATH)]
    credentials: PathBuf,

    /// OAuth scopes to request; the read-only defaults when omitted.
    #[arg(long = "scope")]
    scopes: Vec<String>,
}

impl AuthArgs {
    fn connect(&self) -> Result<Arc<dyn SpreadsheetService>> {
        let scopes = (!self.scopes.is_empty()).then(|| self.scopes.clone());
        let client = GoogleSheetsClient::authorize(Some(&self.credentials), scopes)?;
        Ok(Arc::new(client))
    }
}

#[derive(clap::Args)]
struct TargetArgs {
    /// Directory holding the local mirrors; the shared temp directory when omitted.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// File format of the local mirrors.
    #[arg(long, value_enum, default_value_t = MirrorFormat::Tsv)]
    format: MirrorFormat,
}

impl TargetArgs {
    fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => config::temp_dir(),
        }
    }
}

#[derive(clap::Args)]
struct SyncArgs {
    /// Short names of the sheets to sync; all known sheets when omitted.
    names: Vec<String>,

    /// Download even when the local mirror is up to date.
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    auth: AuthArgs,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Short name of the sheet.
    name: String,

    /// Worksheet tab to mirror instead of the first one.
    #[arg(long)]
    tab: Option<String>,

    /// Number of leading records to drop after the header.
    #[arg(long, default_value_t = 0)]
    skip_header: usize,

    /// Column position used as the row key.
    #[arg(long, default_value_t = 0)]
    index_col: usize,

    /// Do not designate an index column.
    #[arg(long, conflicts_with = "index_col")]
    no_index: bool,

    /// Download even when the local mirror is up to date.
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    auth: AuthArgs,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MirrorFormat {
    Tsv,
    Xlsx,
    Json,
}

impl From<MirrorFormat> for FileFormat {
    fn from(format: MirrorFormat) -> Self {
        match format {
            MirrorFormat::Tsv => FileFormat::Tsv,
            MirrorFormat::Xlsx => FileFormat::Xlsx,
            MirrorFormat::Json => FileFormat::Json,
        }
    }
}
