//! Frame analysis worker binary.
//!
//! Usage: `reframe-worker <video_id>...`

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reframe_models::VideoId;
use reframe_worker::{VideoProcessor, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reframe_worker=info,reframe_media=info"));

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
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let video_ids: Vec<VideoId> = std::env::args().skip(1).map(VideoId::from).collect();
    if video_ids.is_empty() {
        anyhow::bail!("usage: reframe-worker <video_id>...");
    }

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let processor = VideoProcessor::new(config);
    for video_id in &video_ids {
        let summary = processor.process(video_id).await?;
        info!(
            video_id = %summary.video_id,
            run_id = %summary.run_id,
            frames = summary.frame_count,
            "Video analyzed"
        );
    }

    info!("Worker finished");
    Ok(())
}
