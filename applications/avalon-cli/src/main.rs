/// Avalon CLI - collection reports, exports and supplemental file uploads
use anyhow::Context;
use avalon_cli::{
    commands::{
        captions, collections,
        media_objects::{self, TranscriptPdfOptions},
        supplemental,
    },
    output, CliConfig, Session,
};
use avalon_client::Instance;
use avalon_export::FfmpegEncoder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "avalon")]
#[command(about = "Tools for the Avalon media platform REST API", long_about = None)]
struct Cli {
    /// Avalon instance: prod or pre
    #[arg(short, long, global = true, default_value = "pre", env = "AVALON_INSTANCE")]
    instance: String,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every collection as JSON
    PrintAllCollections,
    /// Print one collection as JSON
    GetCollection {
        /// Collection id
        #[arg(short, long)]
        collection: String,
    },
    /// Write a CSV of the master files in a collection
    GetFileIdsFromACollection {
        #[arg(short, long)]
        collection: String,
        #[arg(short, long, default_value = "output.csv")]
        output: PathBuf,
    },
    /// Write a CSV of the HLS stream of each master file in a collection
    WriteHlsReport {
        #[arg(short, long)]
        collection: String,
        #[arg(short, long, default_value = "hls.csv")]
        output: PathBuf,
    },
    /// Extract MP3 audio from the best derivative of each master file
    DownloadBestFiles {
        #[arg(short, long)]
        collection: String,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write every media object of a collection to a JSON file
    ExportCollectionJson {
        #[arg(short, long)]
        collection: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a media object as JSON
    GetMediaObject {
        /// Media object id
        #[arg(short, long)]
        media_object: String,
    },
    /// Write a media object's raw JSON to a file
    ExportMediaObjectJson {
        #[arg(short, long)]
        media_object: String,
        #[arg(short, long, default_value = "example.json")]
        output: PathBuf,
    },
    /// Set the thumbnail and poster offsets of a media object
    UpdateOffsets {
        #[arg(short, long)]
        media_object: String,
        /// Offset in milliseconds
        #[arg(long)]
        offset: u64,
    },
    /// Print the supplemental files of a master file
    ListSupplementalFiles {
        /// Master file id
        #[arg(short = 'f', long)]
        master_file: String,
    },
    /// Print or save one supplemental file
    GetSupplementalFile {
        #[arg(short = 'f', long)]
        master_file: String,
        /// Supplemental file id
        #[arg(short, long)]
        supplemental_file: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mark a supplemental file as a transcript
    TreatAsTranscript {
        #[arg(short = 'f', long)]
        master_file: String,
        #[arg(short, long)]
        supplemental_file: String,
    },
    /// Upload PDFs, captions and transcripts listed in a CSV manifest
    UploadSupplementalFiles {
        /// Manifest with columns id, filename, label, type
        #[arg(long)]
        csv: PathBuf,
    },
    /// Check that caption files are valid WebVTT
    ValidateCaptions {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Render a media object's metadata and caption text to PDF
    ExportTranscriptPdf {
        #[arg(short, long)]
        media_object: String,
        /// Caption file with the transcript text
        #[arg(long)]
        vtt: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Heading to use instead of the collection name
        #[arg(long)]
        collection_title: Option<String>,
        /// Leave out the machine-generated transcript disclaimer
        #[arg(long)]
        no_warning: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "avalon=info,avalon_cli=info,avalon_client=info,avalon_export=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Caption validation is local and needs no API key
    if let Commands::ValidateCaptions { paths } = &cli.command {
        return validate(paths).await;
    }

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let instance = Instance::from_name(&cli.instance);
    let session = Session::new(config, instance, cli.quiet)
        .with_context(|| format!("Failed to connect to the {} instance", instance))?;

    run(&session, cli.command).await
}

async fn run(session: &Session, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::PrintAllCollections => {
            output::print_json(&collections::all_collections(session).await?)?;
        }
        Commands::GetCollection { collection } => {
            output::print_json(&collections::collection(session, &collection).await?)?;
        }
        Commands::GetFileIdsFromACollection { collection, output } => {
            let rows = collections::export_file_ids(session, &collection, &output).await?;
            println!("Wrote {} rows to {}", rows, output.display());
        }
        Commands::WriteHlsReport { collection, output } => {
            let rows = collections::write_hls_report(session, &collection, &output).await?;
            println!("Wrote {} rows to {}", rows, output.display());
        }
        Commands::DownloadBestFiles { collection, output } => {
            let encoder = FfmpegEncoder::new(session.config.tools.ffmpeg_path.clone());
            let report =
                collections::download_best_files(session, &collection, &output, encoder).await?;

            println!(
                "Extracted {}, skipped {}, failed {}",
                report.extracted.len(),
                report.skipped.len(),
                report.failed.len()
            );
            for failure in &report.failed {
                println!("  {}: {}", failure.target.file_id, failure.reason);
            }
            if !report.failed.is_empty() {
                anyhow::bail!("{} files could not be extracted", report.failed.len());
            }
        }
        Commands::ExportCollectionJson { collection, output } => {
            let items = collections::export_collection_json(session, &collection, &output).await?;
            println!("Wrote {} media objects to {}", items, output.display());
        }
        Commands::GetMediaObject { media_object } => {
            output::print_json(&media_objects::media_object(session, &media_object).await?)?;
        }
        Commands::ExportMediaObjectJson {
            media_object,
            output,
        } => {
            media_objects::export_media_object_json(session, &media_object, &output).await?;
        }
        Commands::UpdateOffsets {
            media_object,
            offset,
        } => {
            let update = media_objects::update_offsets(session, &media_object, offset).await?;
            println!("{}", update.status);
            println!("{}", update.body);
        }
        Commands::ListSupplementalFiles { master_file } => {
            output::print_json(&supplemental::list(session, &master_file).await?)?;
        }
        Commands::GetSupplementalFile {
            master_file,
            supplemental_file,
            output,
        } => {
            let raw = supplemental::get(session, &master_file, &supplemental_file, output.as_deref())
                .await?;
            if output.is_none() {
                output::print_json(&raw)?;
            }
        }
        Commands::TreatAsTranscript {
            master_file,
            supplemental_file,
        } => {
            supplemental::treat_as_transcript(session, &master_file, &supplemental_file).await?;
            println!("Supplemental file {} marked as transcript", supplemental_file);
        }
        Commands::UploadSupplementalFiles { csv } => {
            let summary = supplemental::upload_from_manifest(session, &csv)
                .await
                .with_context(|| format!("Failed to read manifest {}", csv.display()))?;

            println!(
                "Uploaded {}, skipped {} rows, {} rows failed",
                summary.uploaded.len(),
                summary.skipped.len(),
                summary.failed.len()
            );
            for failure in &summary.failed {
                println!(
                    "  row {} ({}): {}",
                    failure.row, failure.master_file_id, failure.reason
                );
            }
            if !summary.is_success() {
                anyhow::bail!("{} manifest rows failed", summary.failed.len());
            }
        }
        Commands::ValidateCaptions { paths } => {
            validate(&paths).await?;
        }
        Commands::ExportTranscriptPdf {
            media_object,
            vtt,
            output,
            collection_title,
            no_warning,
        } => {
            let options = TranscriptPdfOptions {
                media_object_id: media_object,
                vtt,
                output,
                collection_title,
                warning: !no_warning,
            };
            media_objects::export_transcript_pdf(session, &options).await?;
            println!("Wrote {}", options.output.display());
        }
    }

    Ok(())
}

async fn validate(paths: &[PathBuf]) -> anyhow::Result<()> {
    let checks = captions::validate_captions(paths).await;

    for check in &checks {
        match &check.problem {
            None => println!("valid    {}", check.path.display()),
            Some(problem) => println!("invalid  {}: {}", check.path.display(), problem),
        }
    }

    let invalid = checks.iter().filter(|check| !check.is_valid()).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} caption files are invalid", invalid, checks.len());
    }
    Ok(())
}
