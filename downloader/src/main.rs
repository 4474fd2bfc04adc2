/// Clipgrab - Main Entry Point
///
/// Downloads one audio file from the media API and saves it to the output
/// directory, drawing a progress line on stderr while the transfer runs.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use clipgrab_downloader::render::run_renderer;
use clipgrab_downloader::{
    ConsoleNotifier, DownloadController, DownloadOutcome, DownloaderConfig, FileSaver,
    HttpTransport,
};

#[derive(Debug, Parser)]
#[command(name = "clipgrab", version, about = "Download an audio file with progress reporting")]
struct Cli {
    /// Identifier of the remote file
    file_id: String,

    /// Filename to use when the server does not provide one
    #[arg(short, long)]
    name: Option<String>,

    /// API root, overrides CLIPGRAB_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Directory to save into, overrides CLIPGRAB_OUTPUT_DIR
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the download result as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipgrab_downloader=info,clipgrab_shared=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = DownloaderConfig::from_env().context("Invalid configuration")?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(output_dir) = cli.output_dir {
        config = config.with_output_dir(output_dir);
    }
    config.ensure_output_dir()?;
    info!("Using API at {}", config.base_url);

    let transport = HttpTransport::new(&config)?;
    let saver = FileSaver::new(&config.output_dir);
    let controller = DownloadController::new(transport, saver, ConsoleNotifier);

    let renderer = tokio::spawn(run_renderer(controller.subscribe(), std::io::stderr()));
    let outcome = controller
        .start_download(&cli.file_id, cli.name.as_deref())
        .await;

    // Dropping the controller closes the state channel and ends the renderer.
    drop(controller);
    let _ = renderer.await;

    match outcome {
        DownloadOutcome::Saved(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Saved {}", result.file_path);
            }
            Ok(ExitCode::SUCCESS)
        }
        DownloadOutcome::Failed(_) | DownloadOutcome::Busy => Ok(ExitCode::FAILURE),
    }
}
