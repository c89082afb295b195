//! Configuration management for rgbmaker.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, RgbError};
use crate::survey::ImagesOption;

/// Command-line arguments for rgbmaker
#[derive(Parser, Debug)]
#[command(name = "rgbmaker")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON bundle holding bands, catalog rows and the WCS
    pub bundle: Option<PathBuf>,

    /// Name credited on the figures
    #[arg(short, long, env = "RGBMAKER_NAME")]
    pub name: Option<String>,

    /// Side of the square field in degrees (at most 2.0)
    #[arg(short, long, env = "RGBMAKER_RADIUS")]
    pub radius: Option<f64>,

    /// Pixels along each side of the images
    #[arg(long, env = "RGBMAKER_PX")]
    pub px: Option<usize>,

    /// Figure set: 1 = ROR/IOU/Optical composites, 2 = contours on DSS2 Red
    #[arg(short, long, env = "RGBMAKER_IMAGES")]
    pub images: Option<u8>,

    /// Spectral-index table (JSON list of points)
    #[arg(long, env = "RGBMAKER_SPIDX")]
    pub spidx: Option<PathBuf>,

    /// Directory the PNG files are written to
    #[arg(short, long, env = "RGBMAKER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Do not put the credit line on the figures
    #[arg(long)]
    pub no_annotate: bool,

    /// Path to JSON configuration file
    #[arg(short, long, env = "RGBMAKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fluxes at the two frequencies, e.g. `424,60`, to print their spectral index
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub flux: Option<Vec<f64>>,

    /// Frequencies (MHz) matching `--flux`
    #[arg(long, value_delimiter = ',', default_value = "150,1420")]
    pub freq: Vec<f64>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "RGBMAKER_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Name credited on the figures
    #[serde(default)]
    pub name: String,

    /// Pixels along each side of the images
    #[serde(default = "default_px")]
    pub px: usize,

    /// Side of the square field in degrees
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Figure set (1 or 2)
    #[serde(default = "default_images")]
    pub images: u8,

    /// Number of contour levels per band
    #[serde(default = "default_contour_levels")]
    pub contour_levels: usize,

    /// Spectral-index table path
    #[serde(default)]
    pub spidx_file: Option<PathBuf>,
}

/// Contour floors per radio survey, in the survey's native units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourFloors {
    #[serde(default = "default_tgss_floor")]
    pub tgss: f64,

    #[serde(default = "default_nvss_floor")]
    pub nvss: f64,

    #[serde(default = "default_first_floor")]
    pub first: f64,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the PNG files are written to
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Put the credit line on the figures
    #[serde(default = "default_annotate")]
    pub annotate: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Contour floors
    #[serde(default)]
    pub contours: ContourFloors,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Args)> {
        let args = Args::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args))
    }

    /// Build the configuration from already parsed arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(name) = &args.name {
            config.query.name = name.clone();
        }
        if let Some(radius) = args.radius {
            config.query.radius = radius;
        }
        if let Some(px) = args.px {
            config.query.px = px;
        }
        if let Some(images) = args.images {
            config.query.images = images;
        }
        if args.spidx.is_some() {
            config.query.spidx_file = args.spidx.clone();
        }
        if let Some(output) = &args.output {
            config.output.dir = output.clone();
        }
        if args.no_annotate {
            config.output.annotate = false;
        }
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if !other.query.name.is_empty() {
            self.query.name = other.query.name;
        }
        self.query.px = other.query.px;
        self.query.radius = other.query.radius;
        self.query.images = other.query.images;
        self.query.contour_levels = other.query.contour_levels;
        if other.query.spidx_file.is_some() {
            self.query.spidx_file = other.query.spidx_file;
        }
        self.contours = other.contours;
        self.output = other.output;
        self.log_level = other.log_level;
    }

    /// Figure set selected by `query.images`
    pub fn images_option(&self) -> Result<ImagesOption> {
        ImagesOption::try_from(self.query.images)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.query.px == 0 {
            return Err(RgbError::Config {
                message: "Image size (px) cannot be 0".to_string(),
            });
        }

        if !(self.query.radius > 0.0) {
            return Err(RgbError::Config {
                message: format!("Radius must be positive, got {}", self.query.radius),
            });
        }

        if self.query.contour_levels == 0 {
            return Err(RgbError::Config {
                message: "At least one contour level is required".to_string(),
            });
        }

        self.images_option().map_err(|e| RgbError::Config {
            message: e.to_string(),
        })?;

        for (survey, floor) in [
            ("tgss", self.contours.tgss),
            ("nvss", self.contours.nvss),
            ("first", self.contours.first),
        ] {
            if !floor.is_finite() {
                return Err(RgbError::Config {
                    message: format!("Contour floor for {} must be finite", survey),
                });
            }
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(RgbError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            contours: ContourFloors::default(),
            output: OutputConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            px: default_px(),
            radius: default_radius(),
            images: default_images(),
            contour_levels: default_contour_levels(),
            spidx_file: None,
        }
    }
}

impl Default for ContourFloors {
    fn default() -> Self {
        Self {
            tgss: default_tgss_floor(),
            nvss: default_nvss_floor(),
            first: default_first_floor(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            annotate: default_annotate(),
        }
    }
}

// Default value functions for serde
fn default_px() -> usize {
    480
}

fn default_radius() -> f64 {
    0.12
}

fn default_images() -> u8 {
    2
}

fn default_contour_levels() -> usize {
    crate::contour::DEFAULT_LEVEL_COUNT
}

fn default_tgss_floor() -> f64 {
    0.015
}

fn default_nvss_floor() -> f64 {
    0.0015
}

fn default_first_floor() -> f64 {
    0.0005
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_annotate() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
