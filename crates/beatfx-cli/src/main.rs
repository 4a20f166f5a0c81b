//! BeatFX command-line client.
//!
//! A thin presentation layer over the session orchestrator: it selects a
//! file, expresses intents, and prints the resulting snapshots. All state
//! decisions live in `beatfx-session`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use beatfx_client::EffectsClient;
use beatfx_models::params::{
    DEFAULT_AMBIENT_EMISSION_RATE, DEFAULT_BELL_CURVE_WIDTH, DEFAULT_EFFECT_LIFETIME_FRAMES,
    DEFAULT_FEATURE_THRESHOLD, DEFAULT_MAX_SHAPE_SIZE, DEFAULT_MIN_SHAPE_SIZE,
    DEFAULT_NEIGHBOR_LINK_COUNT, DEFAULT_POINTS_PER_BEAT, DEFAULT_POSITION_JITTER_PX,
};
use beatfx_models::{ParameterSet, SessionStatus, SourceFile, Tunable};
use beatfx_session::{suggested_artifact_name, FileSink, SessionOrchestrator, SessionSnapshot};

/// Frame rate used when neither `--fps` nor `--auto-fps` is given.
const DEFAULT_CLI_FPS: u32 = 30;

#[derive(Parser)]
#[command(name = "beatfx")]
#[command(about = "Submit videos to the BeatFX rendering service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the rendering service is reachable
    Ping,
    /// Render a video, download the artifact, and clean up the remote job
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Video file to process
    file: PathBuf,

    /// Directory the processed artifact is written into
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Leave the artifact on the service instead of deleting it
    #[arg(long)]
    keep_remote: bool,

    /// Output frame rate
    #[arg(long, conflicts_with = "auto_fps")]
    fps: Option<u32>,

    /// Let the service keep the source frame rate
    #[arg(long)]
    auto_fps: bool,

    /// Frames an emitted effect stays alive
    #[arg(long, default_value_t = DEFAULT_EFFECT_LIFETIME_FRAMES)]
    life_frames: u32,

    /// Emission points spawned per detected beat
    #[arg(long, default_value_t = DEFAULT_POINTS_PER_BEAT)]
    pts_per_beat: u32,

    /// Baseline emission rate between beats, in points per second
    #[arg(long, default_value_t = DEFAULT_AMBIENT_EMISSION_RATE)]
    ambient_rate: f64,

    /// Random positional jitter in pixels
    #[arg(long, default_value_t = DEFAULT_POSITION_JITTER_PX)]
    jitter_px: f64,

    /// Smallest rendered shape size
    #[arg(long, default_value_t = DEFAULT_MIN_SHAPE_SIZE)]
    min_size: u32,

    /// Largest rendered shape size
    #[arg(long, default_value_t = DEFAULT_MAX_SHAPE_SIZE)]
    max_size: u32,

    /// Neighbor links drawn from each point
    #[arg(long, default_value_t = DEFAULT_NEIGHBOR_LINK_COUNT)]
    neighbor_links: u32,

    /// Corner-detection threshold used by the service
    #[arg(long, default_value_t = DEFAULT_FEATURE_THRESHOLD)]
    feature_threshold: u32,

    /// Width of the bell curve shaping size falloff
    #[arg(long, default_value_t = DEFAULT_BELL_CURVE_WIDTH)]
    bell_width: f64,

    /// Pin the service's RNG seed for reproducible renders
    #[arg(long)]
    seed: Option<i64>,
}

impl RenderArgs {
    fn params(&self) -> ParameterSet {
        let frame_rate = if self.auto_fps {
            Tunable::Auto
        } else {
            Tunable::Explicit(self.fps.unwrap_or(DEFAULT_CLI_FPS))
        };
        ParameterSet {
            frame_rate,
            effect_lifetime_frames: self.life_frames,
            points_per_beat: self.pts_per_beat,
            ambient_emission_rate: self.ambient_rate,
            position_jitter_px: self.jitter_px,
            min_shape_size: self.min_size,
            max_shape_size: self.max_size,
            neighbor_link_count: self.neighbor_links,
            feature_threshold: self.feature_threshold,
            bell_curve_width: self.bell_width,
            random_seed: self.seed.into(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let client = EffectsClient::from_env()?;

    match cli.command {
        Commands::Ping => run_ping(client).await,
        Commands::Render(args) => run_render(args, client).await,
    }
}

/// Colored output for dev, JSON when LOG_FORMAT=json.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("beatfx_client=info".parse().unwrap())
        .add_directive("beatfx_session=info".parse().unwrap())
        .add_directive("beatfx_cli=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run_ping(client: EffectsClient) -> anyhow::Result<()> {
    client.check_reachable().await?;
    println!("service reachable at {}", client.base_url());
    Ok(())
}

async fn run_render(args: RenderArgs, client: EffectsClient) -> anyhow::Result<()> {
    let file = SourceFile::from_path(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    if !file.is_supported_container() {
        warn!(
            file = %file.name(),
            "extension is not a known video container, the service may reject it"
        );
    }

    let params = args.params();
    let sink = FileSink::new(&args.out);
    let orchestrator = SessionOrchestrator::new(client, Arc::new(sink.clone()));

    orchestrator.select_file(file).await;

    let snapshot = orchestrator.request_process(&params).await;
    print_snapshot("process", &snapshot)?;
    match snapshot.status {
        SessionStatus::Ready => {}
        SessionStatus::Failed => anyhow::bail!("processing failed: {}", detail_of(&snapshot)),
        // Validation problems surface without leaving Idle.
        _ => anyhow::bail!("submission rejected: {}", detail_of(&snapshot)),
    }

    let snapshot = orchestrator.request_download().await;
    print_snapshot("download", &snapshot)?;
    if snapshot.error_detail.is_some() {
        anyhow::bail!(
            "download failed, remote artifact kept: {}",
            detail_of(&snapshot)
        );
    }
    let artifact_name = suggested_artifact_name(
        snapshot
            .result
            .as_ref()
            .and_then(|r| r.output_filename.as_deref()),
        snapshot.source.as_ref().map(|s| s.name.as_str()),
    );
    println!("saved {}", sink.path_for(&artifact_name).display());

    if args.keep_remote {
        if let Some(result) = &snapshot.result {
            println!("remote artifact kept, preview at {}", result.preview_url);
        }
        return Ok(());
    }

    let snapshot = orchestrator.request_delete().await;
    print_snapshot("delete", &snapshot)?;
    if snapshot.error_detail.is_some() {
        anyhow::bail!(
            "delete failed, artifact still on the service: {}",
            detail_of(&snapshot)
        );
    }

    Ok(())
}

fn print_snapshot(phase: &str, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
    println!("{phase}: {}", serde_json::to_string(snapshot)?);
    Ok(())
}

fn detail_of(snapshot: &SessionSnapshot) -> &str {
    snapshot.error_detail.as_deref().unwrap_or("no detail recorded")
}
