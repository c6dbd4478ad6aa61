use artify::acquisition::{AcquisitionController, Upload};
use artify::capture::device::CameraDevice;
use artify::capture::still::StillCamera;
use artify::capture::{CameraSettings, CaptureSession, FacingMode};
use artify::collage::CollageStore;
use artify::config::{self, ArtifyConfig};
use artify::imaging::Dimensions;
use artify::notice::Notice;
use artify::output;
use artify::presets::StyleCategory;
use artify::studio::{Studio, StudioError};
use artify::transform::{HttpTransformService, PreviewOutcome, TransformOrchestrator};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "artify")]
#[command(about = "Turn photos into art with a generative image service")]
#[command(long_about = "\
Turn photos into art with a generative image service

Pick a photo (or capture one), pick a style, and get back a quick preview
or a full-resolution rendition. Saved results go into a small collage of
recent work.

Examples:

  artify styles --category anime
  artify preview me.jpg --style studio-ghibli
  artify transform me.jpg --style film-noir --save
  artify capture --feed webcam.png --facing rear --style pixel-art

The transform service location, camera tuning and collage file are read
from config.toml. Run 'artify gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List art styles by category, most popular first
    Styles {
        /// Only show one category (e.g. "anime", "Photography Effects")
        #[arg(long)]
        category: Option<String>,
    },
    /// Generate a quick low-resolution preview
    Preview {
        /// Photo to transform (JPEG, PNG or WebP, at most 4 MiB)
        photo: PathBuf,
        /// Style id, as listed by `artify styles`
        #[arg(long)]
        style: String,
        /// Where to write the result
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Generate the full-resolution rendition
    Transform {
        /// Photo to transform (JPEG, PNG or WebP, at most 4 MiB)
        photo: PathBuf,
        /// Style id, as listed by `artify styles`
        #[arg(long)]
        style: String,
        /// Where to write the result
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Also add the result to the collage
        #[arg(long)]
        save: bool,
    },
    /// Capture a still from a camera feed
    Capture {
        /// Image to use as the camera feed (a test pattern when omitted)
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Camera to use (overrides camera.facing)
        #[arg(long, value_enum)]
        facing: Option<FacingMode>,
        /// Preview the capture in this style
        #[arg(long)]
        style: Option<String>,
        /// Where to write the result
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List the most recent collage entries
    Collage,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=artify=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Styles { category } => {
            let only = match category {
                Some(name) => Some(
                    StyleCategory::parse(&name)
                        .ok_or_else(|| format!("unknown style category: {name}"))?,
                ),
                None => None,
            };
            output::print_styles(only);
        }
        Command::Preview {
            photo,
            style,
            out_dir,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let studio = build_studio(&config, StillCamera::test_pattern(idle_feed(&config)))?;
            let notices = studio.subscribe();
            let result = preview(&studio, &photo, &style, &out_dir).await;
            drain_notices(notices);
            result?;
        }
        Command::Transform {
            photo,
            style,
            out_dir,
            save,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let studio = build_studio(&config, StillCamera::test_pattern(idle_feed(&config)))?;
            let notices = studio.subscribe();
            let result = transform(&studio, &photo, &style, &out_dir, save).await;
            drain_notices(notices);
            result?;
        }
        Command::Capture {
            feed,
            facing,
            style,
            out_dir,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let camera = match feed {
                Some(path) => StillCamera::from_file(&path)?,
                None => StillCamera::test_pattern(Dimensions::from(config.camera.max_resolution)),
            };
            let facing = facing.unwrap_or(config.camera.facing);
            let studio = build_studio(&config, camera)?;
            let notices = studio.subscribe();
            let result = capture(&studio, facing, style.as_deref(), &out_dir).await;
            drain_notices(notices);
            result?;
        }
        Command::Collage => {
            let config = config::load_config(cli.config.as_deref())?;
            let store = CollageStore::new(&config.collage.path);
            output::print_collage(&store.list_recent().await);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

type CliStudio<D> = Studio<D, HttpTransformService>;

fn build_studio<D: CameraDevice>(
    config: &ArtifyConfig,
    camera: D,
) -> Result<CliStudio<D>, Box<dyn std::error::Error>> {
    let session = CaptureSession::with_settings(camera, CameraSettings::from_config(&config.camera));
    Ok(Studio::new(
        AcquisitionController::new(session),
        TransformOrchestrator::new(HttpTransformService::new(&config.service)?),
        CollageStore::new(&config.collage.path),
    ))
}

/// Feed for commands that never open the camera.
fn idle_feed(config: &ArtifyConfig) -> Dimensions {
    Dimensions::from(config.camera.ideal_resolution)
}

/// Print every notice queued so far.
fn drain_notices(mut notices: broadcast::Receiver<Notice>) {
    use broadcast::error::TryRecvError;
    loop {
        match notices.try_recv() {
            Ok(notice) => output::print_notice(&notice),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn upload<D: CameraDevice>(studio: &CliStudio<D>, photo: &Path) -> Result<(), StudioError> {
    let upload = Upload::from_path(photo).await?;
    studio.upload(Some(upload))?;
    Ok(())
}

async fn show_preview<D: CameraDevice>(
    studio: &CliStudio<D>,
    style: &str,
    out_dir: &Path,
) -> Result<(), StudioError> {
    match studio.select_style(style).await? {
        PreviewOutcome::Displayed(preview) => {
            let path = studio.download(out_dir).await?;
            output::print_artifact(&preview, Some(&path));
            Ok(())
        }
        PreviewOutcome::Failed(err) => Err(err.into()),
        // Nothing else requests previews from this process.
        PreviewOutcome::Superseded => Ok(()),
    }
}

async fn preview<D: CameraDevice>(
    studio: &CliStudio<D>,
    photo: &Path,
    style: &str,
    out_dir: &Path,
) -> Result<(), StudioError> {
    upload(studio, photo).await?;
    show_preview(studio, style, out_dir).await
}

async fn transform<D: CameraDevice>(
    studio: &CliStudio<D>,
    photo: &Path,
    style: &str,
    out_dir: &Path,
    save: bool,
) -> Result<(), StudioError> {
    upload(studio, photo).await?;
    studio.set_style(style)?;
    let result = studio.finalize().await?;
    let stamp = chrono::Utc::now().timestamp_millis();
    let path = result.write_into(out_dir, stamp).await?;
    output::print_artifact(&result, Some(&path));
    if save {
        studio.save_to_collage(&result).await?;
    }
    Ok(())
}

async fn capture<D: CameraDevice>(
    studio: &CliStudio<D>,
    facing: FacingMode,
    style: Option<&str>,
    out_dir: &Path,
) -> Result<(), StudioError> {
    studio.start_camera(facing).await?;
    let photo = studio.capture().await?;
    let path = studio.download(out_dir).await?;
    output::print_artifact(&photo, Some(&path));
    if let Some(style) = style {
        show_preview(studio, style, out_dir).await?;
    }
    Ok(())
}
