//! Medley Media - command-line front end
//!
//! Small host around the media pipeline for inspecting how a path resolves:
//! classify it, fetch its bytes (optionally through the temp-file cache), or
//! run the image pipeline against a configurable display.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medley_media::config::{ConfigOverrides, MediaConfig};
use medley_media::host::{DirAssetStore, FixedDisplay, StaticPermissions, TokioRunner};
use medley_media::{classify, load_image, materialize, open_media, MediaContext};
use medley_media::READ_EXTERNAL_STORAGE;

/// Command-line arguments for medley-media
#[derive(Parser, Debug)]
#[command(name = "medley-media")]
#[command(about = "Media resolution pipeline inspector")]
#[command(version)]
struct Args {
    /// Directory holding bundled assets
    #[arg(long, default_value = "assets", env = "MEDLEY_ASSET_DIR")]
    asset_dir: PathBuf,

    /// Path prefix treated as removable storage
    #[arg(long, env = "MEDLEY_EXTERNAL_ROOT")]
    external_root: Option<String>,

    /// Grant the storage-read capability
    #[arg(long)]
    grant_storage: bool,

    /// Display width in pixels
    #[arg(long, default_value = "1280")]
    display_width: u32,

    /// Display height in pixels
    #[arg(long, default_value = "800")]
    display_height: u32,

    /// Display density scale
    #[arg(long, default_value = "1.0")]
    density: f32,

    /// Use the fixed legacy decode budget
    #[arg(long)]
    compat: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the source kind for a media path
    Classify { path: String },

    /// Resolve a media path and write its bytes out
    Fetch {
        path: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Materialize through the temp-file cache and print the cached path
        #[arg(long)]
        cache: bool,
    },

    /// Run the image pipeline and report the decoded size
    Probe {
        path: String,

        /// Save the decoded image here (format from the extension)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medley_media=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = MediaConfig::load(ConfigOverrides {
        external_storage_root: args.external_root.clone(),
        ..ConfigOverrides::default()
    })
    .context("Failed to load configuration")?;

    let permissions = if args.grant_storage {
        StaticPermissions::deny_all().grant(READ_EXTERNAL_STORAGE)
    } else {
        StaticPermissions::deny_all()
    };

    let ctx = MediaContext::builder()
        .assets(DirAssetStore::new(args.asset_dir.clone()))
        .permissions(permissions)
        .display(FixedDisplay {
            width: args.display_width,
            height: args.display_height,
            density_scale: args.density,
            compatibility_mode: args.compat,
        })
        .runner(TokioRunner::current())
        .config(config)
        .build();

    // The pipeline is blocking I/O; keep it off the async core.
    let command = args.command;
    tokio::task::spawn_blocking(move || run_command(ctx, command))
        .await
        .context("Pipeline task panicked")?
}

fn run_command(ctx: Arc<MediaContext>, command: Command) -> Result<()> {
    match command {
        Command::Classify { path } => {
            println!("{path}: {}", classify(&ctx, &path));
        }

        Command::Fetch { path, out, cache } => {
            if cache {
                let local = materialize(&ctx, &path)
                    .with_context(|| format!("Failed to materialize {path}"))?;
                println!("{}", local.display());
                return Ok(());
            }

            let mut stream =
                open_media(&ctx, &path).with_context(|| format!("Failed to open {path}"))?;
            match out {
                Some(out) => {
                    let mut file = std::fs::File::create(&out)
                        .with_context(|| format!("Failed to create {}", out.display()))?;
                    let bytes = std::io::copy(&mut stream, &mut file)?;
                    info!("wrote {bytes} bytes to {}", out.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut lock = stdout.lock();
                    std::io::copy(&mut stream, &mut lock)?;
                    lock.flush()?;
                }
            }
        }

        Command::Probe { path, out } => {
            let loaded =
                load_image(&ctx, &path).with_context(|| format!("Failed to load image {path}"))?;
            match loaded {
                Some(scaled) => {
                    println!(
                        "{path}: {}x{} at density {}",
                        scaled.width(),
                        scaled.height(),
                        scaled.density
                    );
                    if let Some(out) = out {
                        scaled
                            .image
                            .save(&out)
                            .with_context(|| format!("Failed to save {}", out.display()))?;
                        info!("saved decoded image to {}", out.display());
                    }
                }
                None => println!("{path}: no image"),
            }
        }
    }
    Ok(())
}
