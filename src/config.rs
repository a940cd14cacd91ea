use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Inclusive hue band on the 8-bit HSV scale (0-180).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueRange {
    pub min: u8,
    pub max: u8,
}

impl HueRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Check whether a hue falls inside the band.
    pub fn contains(&self, hue: u8) -> bool {
        hue >= self.min && hue <= self.max
    }
}

/// Color segmentation configuration.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Hue band for bullish (green) candles.
    pub bullish_hue: HueRange,
    /// Low end of the red band (red wraps around hue 0).
    pub bearish_hue_low: HueRange,
    /// High end of the red band.
    pub bearish_hue_high: HueRange,
    /// Minimum saturation; excludes gray background and grid lines.
    pub min_saturation: u8,
    /// Minimum value; excludes near-black background.
    pub min_value: u8,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            bullish_hue: HueRange::new(35, 85),
            bearish_hue_low: HueRange::new(0, 10),
            bearish_hue_high: HueRange::new(170, 180),
            min_saturation: 50,
            min_value: 50,
        }
    }
}

/// Candle extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Regions enclosing this much contour area or less are noise.
    pub min_contour_area: u32,
    /// Minimum bounding box width in pixels.
    pub min_width: u32,
    /// Minimum bounding box height in pixels.
    pub min_height: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_contour_area: 30,
            min_width: 3,
            min_height: 5,
        }
    }
}

/// Market structure configuration.
#[derive(Debug, Clone)]
pub struct StructureConfig {
    /// Maximum pixel distance from a cluster's first extreme to join it.
    pub level_tolerance_px: u32,
    /// Minimum extremes in a cluster before it is reported as a level.
    pub min_level_touches: usize,
    /// Number of trailing candles in the band.
    pub band_period: usize,
    /// Envelope offset in standard deviations.
    pub band_deviation: f64,
    /// Latest candle height over trailing mean that marks exhaustion.
    pub exhaustion_multiplier: f64,
    /// Consecutive same-color candles that mark exhaustion.
    pub exhaustion_run: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            level_tolerance_px: 10,
            min_level_touches: 2,
            band_period: 9,
            band_deviation: 1.5,
            exhaustion_multiplier: 3.0,
            exhaustion_run: 5,
        }
    }
}

/// Signal strategy configuration.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Pixels the latest candle must move past the previous extreme.
    pub breakout_threshold_px: f64,
    /// Distance from a structure level that counts as a zone hit.
    pub zone_proximity_px: f64,
    /// First second of the minute (inclusive) in which signals are emitted.
    pub window_start_second: u32,
    /// Last second of the minute (inclusive) in which signals are emitted.
    pub window_end_second: u32,
    /// Candles required before any rule is evaluated.
    pub min_candles: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            breakout_threshold_px: 20.0,
            zone_proximity_px: 20.0,
            window_start_second: 50,
            window_end_second: 59,
            min_candles: 3,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Analysis cadence (ms).
    pub tick_interval_ms: u64,
    /// Run OCR on every Nth processed frame (0 disables OCR).
    pub ocr_every_n_frames: u64,
    /// Width of the right-hand price strip handed to OCR.
    pub ocr_strip_width: u32,
    /// Frames larger than this are rejected before allocating masks.
    pub max_frame_pixels: u64,
    /// Whether to render the diagnostic overlay.
    pub overlay_enabled: bool,
    /// Screenshot file polled by the file frame source.
    pub frame_path: Option<PathBuf>,
    /// Where the binary writes the overlay, if anywhere.
    pub overlay_path: Option<PathBuf>,
    pub segmentation: SegmentationConfig,
    pub extraction: ExtractionConfig,
    pub structure: StructureConfig,
    pub strategy: StrategyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            ocr_every_n_frames: 15,
            ocr_strip_width: 120,
            max_frame_pixels: 16_777_216,
            overlay_enabled: true,
            frame_path: None,
            overlay_path: None,
            segmentation: SegmentationConfig::default(),
            extraction: ExtractionConfig::default(),
            structure: StructureConfig::default(),
            strategy: StrategyConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

fn env_hue(min_key: &str, max_key: &str, default: HueRange) -> HueRange {
    HueRange::new(env_parse(min_key, default.min), env_parse(max_key, default.max))
}

impl EngineConfig {
    /// Load configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let seg = defaults.segmentation;
        let ext = defaults.extraction;
        let st = defaults.structure;
        let strat = defaults.strategy;

        let config = Self {
            tick_interval_ms: env_parse("TICK_INTERVAL_MS", defaults.tick_interval_ms),
            ocr_every_n_frames: env_parse("OCR_EVERY_N_FRAMES", defaults.ocr_every_n_frames),
            ocr_strip_width: env_parse("OCR_STRIP_WIDTH", defaults.ocr_strip_width),
            max_frame_pixels: env_parse("MAX_FRAME_PIXELS", defaults.max_frame_pixels),
            overlay_enabled: env_flag("OVERLAY_ENABLED", defaults.overlay_enabled),
            frame_path: env::var("FRAME_PATH").ok().map(PathBuf::from),
            overlay_path: env::var("OVERLAY_PATH").ok().map(PathBuf::from),
            segmentation: SegmentationConfig {
                bullish_hue: env_hue("BULL_HUE_MIN", "BULL_HUE_MAX", seg.bullish_hue),
                bearish_hue_low: env_hue("BEAR_LOW_HUE_MIN", "BEAR_LOW_HUE_MAX", seg.bearish_hue_low),
                bearish_hue_high: env_hue(
                    "BEAR_HIGH_HUE_MIN",
                    "BEAR_HIGH_HUE_MAX",
                    seg.bearish_hue_high,
                ),
                min_saturation: env_parse("MIN_SATURATION", seg.min_saturation),
                min_value: env_parse("MIN_VALUE", seg.min_value),
            },
            extraction: ExtractionConfig {
                min_contour_area: env_parse("MIN_CONTOUR_AREA", ext.min_contour_area),
                min_width: env_parse("MIN_CANDLE_WIDTH", ext.min_width),
                min_height: env_parse("MIN_CANDLE_HEIGHT", ext.min_height),
            },
            structure: StructureConfig {
                level_tolerance_px: env_parse("LEVEL_TOLERANCE_PX", st.level_tolerance_px),
                min_level_touches: env_parse("MIN_LEVEL_TOUCHES", st.min_level_touches),
                band_period: env_parse("BAND_PERIOD", st.band_period),
                band_deviation: env_parse("BAND_DEVIATION", st.band_deviation),
                exhaustion_multiplier: env_parse("EXHAUSTION_MULTIPLIER", st.exhaustion_multiplier),
                exhaustion_run: env_parse("EXHAUSTION_RUN", st.exhaustion_run),
            },
            strategy: StrategyConfig {
                breakout_threshold_px: env_parse(
                    "BREAKOUT_THRESHOLD_PX",
                    strat.breakout_threshold_px,
                ),
                zone_proximity_px: env_parse("ZONE_PROXIMITY_PX", strat.zone_proximity_px),
                window_start_second: env_parse("SIGNAL_WINDOW_START", strat.window_start_second),
                window_end_second: env_parse("SIGNAL_WINDOW_END", strat.window_end_second),
                min_candles: env_parse("MIN_CANDLES", strat.min_candles),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break classifier invariants.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tick interval must be positive".into()));
        }

        let seg = &self.segmentation;
        for (name, range) in [
            ("bullish hue", seg.bullish_hue),
            ("bearish low hue", seg.bearish_hue_low),
            ("bearish high hue", seg.bearish_hue_high),
        ] {
            if range.min > range.max || range.max > 180 {
                return Err(AppError::Config(format!(
                    "{} range {}..={} is invalid",
                    name, range.min, range.max
                )));
            }
        }

        if self.extraction.min_width == 0 || self.extraction.min_height == 0 {
            return Err(AppError::Config("minimum candle size must be positive".into()));
        }

        let st = &self.structure;
        if st.min_level_touches < 1 {
            return Err(AppError::Config("minimum level touches must be at least 1".into()));
        }
        if st.band_period == 0 {
            return Err(AppError::Config("band period must be positive".into()));
        }
        if !(st.band_deviation > 0.0) {
            return Err(AppError::Config("band deviation must be positive".into()));
        }
        if !(st.exhaustion_multiplier > 1.0) {
            return Err(AppError::Config("exhaustion multiplier must exceed 1".into()));
        }
        if st.exhaustion_run < 2 {
            return Err(AppError::Config("exhaustion run must be at least 2".into()));
        }

        let strat = &self.strategy;
        if !(strat.breakout_threshold_px >= 0.0) || !(strat.zone_proximity_px >= 0.0) {
            return Err(AppError::Config("pixel thresholds must not be negative".into()));
        }
        if strat.window_end_second > 59 || strat.window_start_second > strat.window_end_second {
            return Err(AppError::Config(format!(
                "signal window {}..={} is invalid",
                strat.window_start_second, strat.window_end_second
            )));
        }
        if strat.min_candles < 3 {
            return Err(AppError::Config("at least 3 candles are needed to classify".into()));
        }

        Ok(())
    }
}
