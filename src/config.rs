// Runtime configuration: an optional TOML file, then CLI flags on top.

use crate::detector::DetectorOptions;
use crate::engine::CollageSettings;
use crate::error::{Error, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug, Default)]
#[command(name = "pinch-collage")]
#[command(about = "Pinch a frame with thumb and index finger, hold still, and snap a photo tile")]
#[command(version)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Camera device index to start with
    #[arg(long, value_name = "INDEX")]
    pub camera: Option<u32>,

    /// Hold duration before a capture, in milliseconds
    #[arg(long, value_name = "MS")]
    pub hold_ms: Option<u64>,

    /// Inward margin per side of the pinch rectangle, in pixels
    #[arg(long, value_name = "PX")]
    pub margin: Option<f32>,

    /// Show the feed unmirrored
    #[arg(long)]
    pub no_mirror: bool,

    /// Run without the hand detector (tiles can still be dragged)
    #[arg(long)]
    pub no_detector: bool,

    /// Where DOWNLOAD saves the collage
    #[arg(long, value_name = "PATH")]
    pub export_path: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Device index of the "front" camera (shown mirrored)
    #[serde(default)]
    pub index: u32,

    /// Device index SWITCH toggles to (shown unmirrored)
    #[serde(default = "default_alternate_index")]
    pub alternate_index: u32,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GestureConfig {
    /// Hold duration before capture (ms)
    #[serde(default = "default_total_time_ms")]
    pub total_time_ms: u64,

    /// Inward shrink per side (px)
    #[serde(default = "default_margin")]
    pub margin: f32,

    /// Max centre movement between frames (px)
    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: f32,

    /// Minimum width and height to start a hold (px)
    #[serde(default = "default_min_capture_size")]
    pub min_capture_size: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_hit_test_tolerance")]
    pub hit_test_tolerance: f32,

    #[serde(default = "default_true")]
    pub mirrored: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Program and arguments of the landmark model process
    #[serde(default = "default_detector_command")]
    pub command: Vec<String>,

    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

fn default_alternate_index() -> u32 { 1 }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_fps() -> u32 { 30 }
fn default_total_time_ms() -> u64 { 500 }
fn default_margin() -> f32 { 35.0 }
fn default_stability_threshold() -> f32 { 8.0 }
fn default_min_capture_size() -> f32 { 20.0 }
fn default_hit_test_tolerance() -> f32 { 10.0 }
fn default_true() -> bool { true }
fn default_detector_command() -> Vec<String> { vec!["python3".into(), "hand_detect.py".into()] }
fn default_confidence_threshold() -> f32 { 0.5 }
fn default_export_path() -> PathBuf { PathBuf::from("my_collage.jpg") }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            alternate_index: default_alternate_index(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            total_time_ms: default_total_time_ms(),
            margin: default_margin(),
            stability_threshold: default_stability_threshold(),
            min_capture_size: default_min_capture_size(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { hit_test_tolerance: default_hit_test_tolerance(), mirrored: true }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_detector_command(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { path: default_export_path() }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// File (if given) + CLI overrides, validated.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        debug!(?config, "effective configuration");
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(index) = args.camera {
            self.camera.index = index;
        }
        if let Some(ms) = args.hold_ms {
            self.gesture.total_time_ms = ms;
        }
        if let Some(margin) = args.margin {
            self.gesture.margin = margin;
        }
        if args.no_mirror {
            self.input.mirrored = false;
        }
        if args.no_detector {
            self.detector.enabled = false;
        }
        if let Some(path) = &args.export_path {
            self.export.path = path.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::config("camera width and height must be non-zero"));
        }
        if self.camera.fps == 0 {
            return Err(Error::config("camera fps must be non-zero"));
        }
        if self.gesture.total_time_ms == 0 {
            return Err(Error::config("gesture.total_time_ms must be non-zero"));
        }
        let non_negative = [
            ("gesture.margin", self.gesture.margin),
            ("gesture.stability_threshold", self.gesture.stability_threshold),
            ("gesture.min_capture_size", self.gesture.min_capture_size),
            ("input.hit_test_tolerance", self.input.hit_test_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(Error::config(format!("{name} must be >= 0, got {value}")));
            }
        }
        if self.detector.enabled && self.detector.command.is_empty() {
            return Err(Error::config("detector.command must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(Error::config("detector.confidence_threshold must be within 0..=1"));
        }
        Ok(())
    }

    /// The core tunables.
    pub fn settings(&self) -> CollageSettings {
        CollageSettings {
            total_time: Duration::from_millis(self.gesture.total_time_ms),
            margin: self.gesture.margin,
            stability_threshold: self.gesture.stability_threshold,
            min_capture_size: self.gesture.min_capture_size,
            hit_test_tolerance: self.input.hit_test_tolerance,
            mirrored: self.input.mirrored,
        }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            command: self.detector.command.clone(),
            confidence_threshold: self.detector.confidence_threshold,
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
