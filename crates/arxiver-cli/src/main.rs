use std::{io::Write, path::PathBuf, process::ExitCode, sync::Arc};

use arxiver::{
  config::{DEFAULT_METADATA_ENDPOINT, DEFAULT_OUTPUT_DIR, DEFAULT_PDF_ENDPOINT},
  Config, MetadataFetcher, PaperDownloader, PaperIdentity, PaperMetadata, ReqwestTransport,
  TitleLookup,
};
use clap::{builder::ArgAction, Parser, Subcommand};
use console::{style, Emoji};
use errors::CliError;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Parser)]
#[command(author, version, about = "Fetch arXiv paper metadata and download PDFs")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Metadata query endpoint
  #[arg(long, global = true, default_value = DEFAULT_METADATA_ENDPOINT)]
  metadata_endpoint: String,

  /// Base URL PDFs are downloaded from
  #[arg(long, global = true, default_value = DEFAULT_PDF_ENDPOINT)]
  pdf_endpoint: String,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the metadata of a paper
  Metadata {
    /// arXiv identifier, optionally with a version suffix (e.g. 1706.03762v7)
    identifier:    PaperIdentity,
    /// Version suffix to pin, overriding one given in the identifier (e.g. v7)
    #[arg(long)]
    paper_version: Option<String>,
    /// Print the metadata as JSON
    #[arg(long)]
    json:          bool,
  },
  /// Download a paper's PDF, named after its title
  Download {
    /// arXiv identifier, optionally with a version suffix (e.g. 1706.03762v7)
    identifier:    PaperIdentity,
    /// Version suffix to pin, overriding one given in the identifier (e.g. v7)
    #[arg(long)]
    paper_version: Option<String>,
    /// Directory the PDF is written to
    #[arg(long, short, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir:    PathBuf,
    /// How the title used for the filename is obtained (scan, metadata)
    #[arg(long, default_value_t = TitleLookup::Scan)]
    title_lookup:  TitleLookup,
  },
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Applies a `--paper-version` override to a parsed identifier.
fn pin_version(identity: PaperIdentity, paper_version: Option<String>) -> PaperIdentity {
  match paper_version {
    Some(version) => identity.with_version(version),
    None => identity,
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("Command failed: {e}");
      eprintln!("{} {}", style(WARNING).red(), style(&e).red());
      ExitCode::FAILURE
    },
  }
}

async fn run(cli: Cli) -> Result<(), CliError> {
  let config = Config::default()
    .with_metadata_endpoint(&cli.metadata_endpoint)?
    .with_pdf_endpoint(&cli.pdf_endpoint)?;
  trace!("Using configuration: {config:?}");
  let transport = Arc::new(ReqwestTransport::new());

  match cli.command {
    Commands::Metadata { identifier, paper_version, json } => {
      let identity = pin_version(identifier, paper_version);
      let fetcher = MetadataFetcher::from_config(&config, transport)?;

      if !json {
        println!(
          "{} Fetching metadata: {}",
          style(LOOKING_GLASS).cyan(),
          style(&identity).yellow()
        );
      }

      let metadata = fetcher.fetch(&identity).await?;
      debug!("Paper details: {:?}", metadata);

      if json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &metadata)?;
        writeln!(stdout)?;
      } else {
        print_metadata(&metadata);
      }
      Ok(())
    },

    Commands::Download { identifier, paper_version, output_dir, title_lookup } => {
      let identity = pin_version(identifier, paper_version);
      let config = config.with_output_dir(&output_dir).with_title_lookup(title_lookup);
      let downloader = PaperDownloader::from_config(&config, transport)?;

      println!(
        "{} Downloading paper: {} into {}",
        style(DOWNLOAD).cyan(),
        style(&identity).yellow(),
        style(output_dir.display()).yellow()
      );

      let path = downloader.download(&identity).await?;

      println!(
        "{} Paper downloaded to {}",
        style(SUCCESS).green(),
        style(path.display()).yellow()
      );
      Ok(())
    },
  }
}

fn print_metadata(metadata: &PaperMetadata) {
  println!("\n{} Paper details:", style(PAPER).green());
  println!("   {} {}", style("Title:").green().bold(), style(&metadata.title).white());
  println!(
    "   {} {}",
    style("Authors:").green().bold(),
    style(metadata.authors.join(", ")).white()
  );
  println!("   {} {}", style("Published:").green().bold(), style(&metadata.published).white());
  if metadata.updated != metadata.published && !metadata.updated.is_empty() {
    println!("   {} {}", style("Updated:").green().bold(), style(&metadata.updated).white());
  }
  if !metadata.categories.is_empty() {
    println!(
      "   {} {}",
      style("Categories:").green().bold(),
      style(metadata.categories.join(", ")).cyan()
    );
  }
  if !metadata.comment.is_empty() {
    println!("   {} {}", style("Comment:").green().bold(), style(&metadata.comment).white());
  }
  if !metadata.doi.is_empty() {
    println!("   {} {}", style("DOI:").green().bold(), style(&metadata.doi).blue().underlined());
  }
  if !metadata.pdf_url.is_empty() {
    println!(
      "   {} {}",
      style("PDF URL:").green().bold(),
      style(&metadata.pdf_url).blue().underlined()
    );
  }
  if !metadata.abstract_text.is_empty() {
    println!("   {} {}", style("Abstract:").green().bold(), style(&metadata.abstract_text).white());
  }
}
