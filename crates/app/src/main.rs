use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use earshot_app::runtime::{self, RuntimeOptions};
use earshot_app::PipelineConfig;
use earshot_stt::noop::NoopEngine;
use earshot_vad::NullClassifier;

/// Ambient speech listener: segments microphone audio into utterances and
/// prints finalized transcripts.
#[derive(Parser, Debug)]
#[command(name = "earshot", version)]
struct Cli {
    /// Input device name (host default when omitted)
    #[arg(short, long, env = "EARSHOT_DEVICE")]
    device: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let options = RuntimeOptions {
        device: cli.device,
        pipeline: PipelineConfig::default(),
    };

    // The classifier model and recognition engine are external
    // collaborators; library embedders plug real ones into
    // `runtime::start`. The binary runs with placeholders, which still
    // exercises capture, segmentation, and session supervision.
    tracing::warn!("Running with placeholder classifier and recognition engine");
    let (handle, mut utterances) = runtime::start(options, NullClassifier, NoopEngine::new())?;
    tracing::info!("Listening; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(utterance) = utterances.recv() => {
                println!("{}", utterance.text);
            }
        }
    }

    let snapshot = handle.metrics.snapshot();
    handle.shutdown().await;
    tracing::info!(
        frames = snapshot.capture_frames,
        windows = snapshot.windows_classified,
        utterances = snapshot.utterances_dispatched,
        "Stopped"
    );
    Ok(())
}
