use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{LevelFilter, debug, error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tubegrab::{Config, Error, HistoryStatus, Session};
use tubegrab_core::{ErrorKind, ProgressEvent, Quality, VideoMetadata};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "tubegrab", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(
        long = "verbosity",
        short,
        global = true,
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new([
            "info", "debug", "error", "none", "full"
        ])
    )]
    pub verbosity: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the metadata of a video
    Info { url: String },
    /// Download a video
    Download {
        url: String,

        #[arg(
            long = "quality",
            short,
            value_parser = clap::builder::PossibleValuesParser::new([
                "best", "1080p", "720p", "480p", "360p", "audio"
            ])
        )]
        quality: Option<String>,

        #[arg(long = "output-dir", short)]
        output_dir: Option<PathBuf>,
    },
    /// Manage the download history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    List,
    /// Forget the downloads of a file
    Remove { path: PathBuf },
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let multi = MultiProgress::new();

    if let Err(e) = init_logger(&args.verbosity, &multi) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args, &multi).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(e) => error!("{}", describe(e)),
                None => error!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbosity: &str, multi: &MultiProgress) -> Result<(), BoxError> {
    let level = match verbosity {
        "none" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "debug" => LevelFilter::Debug,
        "full" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let logger = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .build();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);

    Ok(())
}

async fn run(args: Cli, multi: &MultiProgress) -> Result<(), BoxError> {
    let mut config = match args.config.or_else(Config::default_path) {
        Some(path) => Config::load(path),
        None => Config::default(),
    };

    if let Command::Download {
        quality,
        output_dir,
        ..
    } = &args.command
    {
        if let Some(quality) = quality {
            config.quality = quality.parse::<Quality>()?;
        }
        if let Some(output_dir) = output_dir {
            config.download_dir = output_dir.clone();
        }
    }

    let session = Session::from_config(&config)?;

    match args.command {
        Command::Info { url } => {
            check_tool(&session).await?;
            let video = session.fetch_metadata(&url).await?;
            print_metadata(&video);
        }
        Command::Download { url, .. } => {
            if !session.check_url(&url) {
                return Err(Error::from(tubegrab_core::Error::InvalidUrl(url)).into());
            }
            check_tool(&session).await?;

            let video = session.fetch_metadata(&url).await?;
            info!("{} by {} ({})", video.title, video.uploader, video.duration_string);
            info!("Saving into {}", session.download_dir().display());

            download(&session, &url, config.quality, multi).await?;
        }
        Command::History { action } => history(&session, action),
    }

    Ok(())
}

async fn check_tool(session: &Session) -> Result<(), Error> {
    let version = session.downloader().version().await?;
    debug!("Using yt-dlp {}", version);
    Ok(())
}

async fn download(
    session: &Session,
    url: &str,
    quality: Quality,
    multi: &MultiProgress,
) -> Result<(), Error> {
    let bar = multi.add(ProgressBar::new(0));
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );

    let result = session
        .download(url, quality, |event| match event {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                filename,
            } => {
                bar.set_length(total_bytes as u64);
                bar.set_position(downloaded_bytes as u64);
                if let Some(filename) = filename {
                    bar.set_message(file_name(&filename));
                }
            }
            ProgressEvent::Finished { filename } => {
                bar.finish_with_message(format!("Finished {}", file_name(&filename)));
            }
        })
        .await;

    if !bar.is_finished() {
        bar.abandon();
    }

    let result = result?;
    info!(
        "Saved {} to {}",
        result.metadata.title,
        result.filepath.display()
    );
    Ok(())
}

fn history(session: &Session, action: HistoryAction) {
    let mut history = session.history();

    match action {
        HistoryAction::List => {
            if history.is_empty() {
                println!("No downloads yet.");
                return;
            }

            for entry in history.list() {
                let marker = match entry.status {
                    HistoryStatus::Completed => " ",
                    HistoryStatus::FileMissing => "!",
                };
                println!(
                    "{} {}  {}  {}\n    {}",
                    marker,
                    entry.date,
                    entry.size,
                    entry.title,
                    entry.filepath.display()
                );
            }
        }
        HistoryAction::Remove { path } => {
            if history.remove(&path) {
                println!("Removed {} from the history.", path.display());
            } else {
                println!("{} is not in the history.", path.display());
            }
        }
        HistoryAction::Clear => {
            history.clear();
            println!("History cleared.");
        }
    }
}

fn print_metadata(video: &VideoMetadata) {
    println!("Title:     {}", video.title);
    println!("Uploader:  {}", video.uploader);
    println!("Duration:  {}", video.duration_string);
    if !video.upload_date.is_empty() {
        println!("Uploaded:  {}", video.upload_date);
    }
    if !video.thumbnail.is_empty() {
        println!("Thumbnail: {}", video.thumbnail);
    }

    if let Some(formats) = &video.formats {
        println!("Formats:");
        for format in formats {
            let resolution = if format.is_audio_only() {
                "audio only"
            } else {
                format.resolution.as_str()
            };
            println!(
                "  {:>8}  {:<5} {:<12} {}",
                format.format_id, format.ext, resolution, format.filesize
            );
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One message per kind of failure.
fn describe(e: &Error) -> String {
    let core = match e {
        Error::Core(core) => core,
        Error::Busy => return "A download is already in progress, wait for it to finish.".into(),
        Error::Config(e) => return format!("The configuration file is malformed: {}", e),
        Error::NoDataDir => return "Could not find a directory to store the history in.".into(),
        Error::Serialize(_) | Error::Io(_) => return e.to_string(),
    };

    match core.kind() {
        ErrorKind::InvalidUrl => "This is not a valid YouTube URL.".into(),
        ErrorKind::EmptyOutput => "yt-dlp returned no information about this video.".into(),
        ErrorKind::Parse => "Could not understand the video information returned by yt-dlp.".into(),
        ErrorKind::Tool => format!("yt-dlp could not fetch the video: {}", core),
        ErrorKind::ToolExit => format!("The download failed: {}", core),
        ErrorKind::NoOutputFile => "The download finished but produced no file.".into(),
        ErrorKind::FileNotFoundAfterDownload => format!("The downloaded file is missing: {}", core),
        ErrorKind::ProcessSpawn => {
            format!("Could not run yt-dlp, is it installed? ({})", core)
        }
        ErrorKind::IO => format!("Could not write the download: {}", core),
        ErrorKind::Timeout => "yt-dlp took too long and was stopped.".into(),
    }
}
