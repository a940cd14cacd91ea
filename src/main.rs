use std::sync::Arc;

use anyhow::Context;
use prisma::services::seconds_to_next_minute;
use prisma::{EngineConfig, FileFrameSource, FrameProcessor, SignalHistory, SignalTracker};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prisma=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = EngineConfig::from_env()?;
    let frame_path = config
        .frame_path
        .clone()
        .context("FRAME_PATH must point at the chart screenshot to analyze")?;
    let overlay_path = config.overlay_path.clone();
    info!("Starting Prisma on {}", frame_path.display());

    let source = Arc::new(FileFrameSource::new(frame_path));
    let processor = Arc::new(FrameProcessor::new(config, source)?);
    let mut snapshots = processor.subscribe();

    let runner = processor.clone();
    let loop_handle = tokio::spawn(async move { runner.start().await });

    let mut tracker = SignalTracker::new();
    let mut history = SignalHistory::new();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let signal = &snapshot.signal;

                if tracker.observe(signal) {
                    info!(
                        "{} {}% via {} [{}] entry in {}s",
                        signal.signal_type.label(),
                        signal.confidence,
                        signal.method,
                        signal.reasons.join(", "),
                        seconds_to_next_minute(chrono::Utc::now())
                    );
                    history.record(signal);
                }

                debug!(
                    "{} candles, pressure {}, phase {}, zone {:?}, {} fps, ocr '{}'",
                    snapshot.candle_count,
                    signal.market_data.pressure_score,
                    signal.market_data.phase.label(),
                    signal.market_data.zone,
                    snapshot.stats.fps,
                    snapshot.stats.ocr_text
                );

                if let (Some(path), Some(overlay)) = (&overlay_path, &snapshot.overlay) {
                    if let Err(e) = overlay.save(path) {
                        warn!("Failed to write overlay to {}: {}", path.display(), e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    processor.stop();
    loop_handle.await?;

    let stats = history.stats();
    info!(
        "Session: {} signals, {} pending",
        history.len(),
        stats.pending
    );
    if !history.is_empty() {
        debug!("Signal history:\n{}", history.to_json()?);
    }

    Ok(())
}
