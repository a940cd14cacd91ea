//! Periodic frame analysis loop.
//!
//! One pass per tick: pull a frame, detect candles, analyze structure, classify,
//! and publish the whole result as a single snapshot. OCR runs as a detached
//! side task whose latest text is picked up by the next pass.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{AppError, Result};
use crate::services::strategy::SignalClassifier;
use crate::services::structure::StructureAnalyzer;
use crate::services::vision::ocr::sanitize_price_text;
use crate::services::vision::{prepare_price_strip, render_overlay, CandleDetector, PriceReader};
use crate::sources::FrameSource;
use crate::types::{MarketStructure, ProcessingStats, SignalData};

/// Everything one pass publishes. Replaced whole on every completed pass.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    pub signal: SignalData,
    pub stats: ProcessingStats,
    pub structure: MarketStructure,
    pub candle_count: usize,
    /// Diagnostic drawing, present when overlays are enabled.
    pub overlay: Option<Arc<RgbaImage>>,
}

/// Drives the analysis pipeline on a fixed cadence.
pub struct FrameProcessor {
    config: EngineConfig,
    detector: CandleDetector,
    analyzer: StructureAnalyzer,
    classifier: SignalClassifier,
    source: Arc<dyn FrameSource>,
    reader: Option<Arc<dyn PriceReader>>,
    frame_count: AtomicU64,
    running: AtomicBool,
    /// Set while an OCR task is in flight.
    ocr_busy: Arc<AtomicBool>,
    /// One-slot mailbox holding the latest recognised price text.
    ocr_text: Arc<watch::Sender<String>>,
    snapshot_tx: watch::Sender<EngineSnapshot>,
    /// Latched once `stop` is called; seen by `start` even if it runs later.
    shutdown_tx: watch::Sender<bool>,
}

impl FrameProcessor {
    /// Create a processor. Fails fast on an invalid configuration.
    pub fn new(config: EngineConfig, source: Arc<dyn FrameSource>) -> Result<Self> {
        config.validate()?;

        let (snapshot_tx, _) = watch::channel(EngineSnapshot::default());
        let (ocr_text, _) = watch::channel(String::new());
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            detector: CandleDetector::new(&config),
            analyzer: StructureAnalyzer::new(config.structure.clone())
                .with_min_candles(config.strategy.min_candles),
            classifier: SignalClassifier::new(config.strategy.clone()),
            config,
            source,
            reader: None,
            frame_count: AtomicU64::new(0),
            running: AtomicBool::new(false),
            ocr_busy: Arc::new(AtomicBool::new(false)),
            ocr_text: Arc::new(ocr_text),
            snapshot_tx,
            shutdown_tx,
        })
    }

    /// Attach an OCR collaborator for the price axis.
    pub fn with_price_reader(mut self, reader: Arc<dyn PriceReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> EngineSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Latest completed OCR text.
    pub fn ocr_text(&self) -> String {
        self.ocr_text.borrow().clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the loop until `stop` is called. Returns at once if it already was.
    pub async fn start(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        if *shutdown_rx.borrow_and_update() {
            debug!("Frame processor already stopped, not starting");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            "Frame processor started ({}ms tick, source: {})",
            self.config.tick_interval_ms,
            self.source.name()
        );

        let mut ticker = interval(Duration::from_millis(self.config.tick_interval_ms));
        // A slow pass delays the next one instead of triggering a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *self.shutdown_tx.borrow() {
                        break;
                    }
                    match self.tick() {
                        Ok(_) => {}
                        Err(AppError::ResourceExhausted(msg)) => {
                            warn!("Pass aborted, resources exhausted: {}", msg);
                        }
                        Err(e) => error!("Frame processor tick error: {}", e),
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("Frame processor received shutdown signal");
                    break;
                }
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }

    /// Halt future ticks. A pass in progress completes first.
    ///
    /// Final: a stopped processor never ticks again, including when `start`
    /// is reached only after this call.
    pub fn stop(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        self.running.store(false, Ordering::SeqCst);
        info!("Frame processor stopped");
    }

    /// Run a single pass against the frame source.
    ///
    /// Returns `Ok(false)` when the pass was skipped because no frame was
    /// available; the previous snapshot then stays in place.
    pub fn tick(&self) -> Result<bool> {
        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("Frame not ready, skipping pass");
                return Ok(false);
            }
            Err(e) if e.is_transient() => {
                debug!("Frame unavailable, skipping pass: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let snapshot = self.process(&frame, Utc::now())?;
        self.snapshot_tx.send_replace(snapshot);
        Ok(true)
    }

    /// Analyze one frame at `now` without publishing.
    pub fn process(&self, frame: &RgbaImage, now: DateTime<Utc>) -> Result<EngineSnapshot> {
        let started = Instant::now();

        let (width, height) = frame.dimensions();
        let pixels = width as u64 * height as u64;
        if pixels > self.config.max_frame_pixels {
            return Err(AppError::ResourceExhausted(format!(
                "frame {}x{} exceeds {} pixels",
                width, height, self.config.max_frame_pixels
            )));
        }

        let frame_count = self.frame_count.fetch_add(1, Ordering::Relaxed) + 1;

        let sequence = self.detector.detect(frame)?;
        let structure = self.analyzer.analyze(&sequence);
        let signal = self.classifier.classify(&sequence, &structure, now);

        let ocr_every = self.config.ocr_every_n_frames;
        if ocr_every > 0 && frame_count % ocr_every == 0 {
            self.dispatch_ocr(frame);
        }

        let overlay = self
            .config
            .overlay_enabled
            .then(|| Arc::new(render_overlay(frame, &sequence, &structure)));

        let elapsed = started.elapsed();
        let stats = ProcessingStats {
            fps: fps_for(elapsed),
            processing_time_ms: elapsed.as_millis() as u64,
            ocr_text: self.ocr_text(),
            frame_count,
        };

        debug!(
            "Pass {} took {}ms: {} candles, pressure {:.1}, phase {}, signal {}",
            frame_count,
            stats.processing_time_ms,
            sequence.len(),
            structure.pressure_score,
            structure.phase.label(),
            signal.signal_type.label()
        );

        Ok(EngineSnapshot {
            signal,
            stats,
            candle_count: sequence.len(),
            structure,
            overlay,
        })
    }

    /// Hand the price strip to the OCR reader on a detached task.
    fn dispatch_ocr(&self, frame: &RgbaImage) {
        let Some(reader) = self.reader.clone() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime for OCR, skipping");
            return;
        };
        if self.ocr_busy.swap(true, Ordering::AcqRel) {
            debug!("OCR still in flight, skipping");
            return;
        }
        let Some(strip) = prepare_price_strip(frame, self.config.ocr_strip_width) else {
            self.ocr_busy.store(false, Ordering::Release);
            return;
        };

        let busy = self.ocr_busy.clone();
        let mailbox = self.ocr_text.clone();
        handle.spawn(async move {
            match reader.recognize(&strip).await {
                Ok(raw) => {
                    mailbox.send_replace(sanitize_price_text(&raw));
                }
                Err(e) => warn!("OCR failed: {}", e),
            }
            busy.store(false, Ordering::Release);
        });
    }
}

fn fps_for(elapsed: Duration) -> u32 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (1.0 / secs).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::StaticFrameSource;
    use crate::types::SignalType;
    use image::{GrayImage, Rgba};
    use std::future::Future;
    use std::pin::Pin;

    const BACKGROUND: Rgba<u8> = Rgba([20, 20, 24, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 200, 80, 255]);
    const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);

    fn fill(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        for yy in y..y + h {
            for xx in x..x + w {
                img.put_pixel(xx, yy, color);
            }
        }
    }

    fn chart_frame() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(240, 160, BACKGROUND);
        fill(&mut img, 10, 40, 8, 40, RED);
        fill(&mut img, 30, 60, 8, 30, GREEN);
        fill(&mut img, 50, 50, 8, 35, GREEN);
        img
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            tick_interval_ms: 10,
            ..EngineConfig::default()
        }
    }

    struct FlakySource;

    impl FrameSource for FlakySource {
        fn name(&self) -> &str {
            "flaky"
        }

        fn next_frame(&self) -> Result<Option<RgbaImage>> {
            Err(AppError::FrameUnavailable("capture lost".to_string()))
        }
    }

    struct FixedReader(&'static str);

    impl PriceReader for FixedReader {
        fn recognize<'a>(
            &'a self,
            _image: &'a GrayImage,
        ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
            Box::pin(async move { Ok(self.0.to_string()) })
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.tick_interval_ms = 0;
        let source = Arc::new(StaticFrameSource::default());
        assert!(FrameProcessor::new(config, source).is_err());
    }

    #[test]
    fn test_not_ready_skips_pass() {
        let processor =
            FrameProcessor::new(test_config(), Arc::new(StaticFrameSource::default())).unwrap();
        assert!(!processor.tick().unwrap());
        assert_eq!(processor.frame_count(), 0);
        assert_eq!(processor.latest().signal, SignalData::default());
    }

    #[test]
    fn test_transient_error_keeps_previous_snapshot() {
        let processor = FrameProcessor::new(test_config(), Arc::new(FlakySource)).unwrap();
        assert!(!processor.tick().unwrap());
        assert_eq!(processor.latest().stats, ProcessingStats::default());
    }

    #[test]
    fn test_pass_publishes_snapshot() {
        let processor =
            FrameProcessor::new(test_config(), Arc::new(StaticFrameSource::new(chart_frame())))
                .unwrap();
        let mut rx = processor.subscribe();

        assert!(processor.tick().unwrap());
        assert!(rx.has_changed().unwrap());

        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.candle_count, 3);
        assert_eq!(snapshot.stats.frame_count, 1);
        assert!(snapshot.structure.pressure_score > 0.0);
        assert_eq!(
            snapshot.overlay.as_ref().map(|o| o.dimensions()),
            Some((240, 160))
        );
    }

    #[test]
    fn test_overlay_disabled() {
        let config = EngineConfig {
            overlay_enabled: false,
            ..test_config()
        };
        let processor =
            FrameProcessor::new(config, Arc::new(StaticFrameSource::new(chart_frame()))).unwrap();
        processor.tick().unwrap();
        assert!(processor.latest().overlay.is_none());
    }

    #[test]
    fn test_oversized_frame_aborts_pass() {
        let config = EngineConfig {
            max_frame_pixels: 1_000,
            ..test_config()
        };
        let processor =
            FrameProcessor::new(config, Arc::new(StaticFrameSource::new(chart_frame()))).unwrap();

        let err = processor.tick().unwrap_err();
        assert!(matches!(err, AppError::ResourceExhausted(_)));
        assert_eq!(processor.frame_count(), 0);
        assert_eq!(processor.latest().candle_count, 0);
    }

    #[test]
    fn test_process_outside_window_is_neutral() {
        use chrono::TimeZone;
        let processor =
            FrameProcessor::new(test_config(), Arc::new(StaticFrameSource::default())).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 12).unwrap();
        let snapshot = processor.process(&chart_frame(), now).unwrap();
        assert_eq!(snapshot.signal.signal_type, SignalType::Neutral);
        assert_eq!(snapshot.signal.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_ocr_without_runtime_is_skipped() {
        let config = EngineConfig {
            ocr_every_n_frames: 1,
            ..test_config()
        };
        let processor =
            FrameProcessor::new(config, Arc::new(StaticFrameSource::new(chart_frame())))
                .unwrap()
                .with_price_reader(Arc::new(FixedReader("1.0")));
        assert!(processor.tick().unwrap());
        assert_eq!(processor.ocr_text(), "");
    }

    #[tokio::test]
    async fn test_ocr_result_merged_into_next_pass() {
        let config = EngineConfig {
            ocr_every_n_frames: 1,
            ..test_config()
        };
        let processor =
            FrameProcessor::new(config, Arc::new(StaticFrameSource::new(chart_frame())))
                .unwrap()
                .with_price_reader(Arc::new(FixedReader("EUR 1.0842 ")));

        processor.tick().unwrap();
        assert_eq!(processor.latest().stats.ocr_text, "");

        for _ in 0..50 {
            if !processor.ocr_text().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(processor.ocr_text(), "1.0842");

        processor.tick().unwrap();
        assert_eq!(processor.latest().stats.ocr_text, "1.0842");
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let processor = Arc::new(
            FrameProcessor::new(test_config(), Arc::new(StaticFrameSource::new(chart_frame())))
                .unwrap(),
        );

        let runner = processor.clone();
        let handle = tokio::spawn(async move { runner.start().await });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(processor.is_running());
        processor.stop();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!processor.is_running());

        let passes = processor.frame_count();
        assert!(passes > 0);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(processor.frame_count(), passes);
    }

    #[tokio::test]
    async fn test_stop_before_start_halts_loop() {
        let processor = Arc::new(
            FrameProcessor::new(test_config(), Arc::new(StaticFrameSource::new(chart_frame())))
                .unwrap(),
        );
        processor.stop();

        let runner = processor.clone();
        let handle = tokio::spawn(async move { runner.start().await });
        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(!processor.is_running());
        assert_eq!(processor.frame_count(), 0);
    }

    #[test]
    fn test_fps_for() {
        assert_eq!(fps_for(Duration::from_millis(50)), 20);
        assert_eq!(fps_for(Duration::ZERO), 0);
    }
}
