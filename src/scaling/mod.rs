//! Intensity scaling laws.
//!
//! Each law maps a raw band into `[0, 1]` between a lower and an upper bound.
//! Bounds left unset are taken from the band's own minimum and maximum.
//! Every law works on a copy; the caller's array is never touched.

pub mod common;
pub mod linear;
pub mod log;
pub mod sqrt;

pub use self::linear::linear;
pub use self::log::{log, try_log, DEFAULT_LOG_FACTOR};
pub use self::sqrt::sqrt;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RgbError;

/// The shape of the transfer curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Law {
    Linear,
    Sqrt,
    Log,
}

impl Law {
    /// Get the name of this law
    pub fn name(&self) -> &'static str {
        match self {
            Law::Linear => "linear",
            Law::Sqrt => "sqrt",
            Law::Log => "log",
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Law {
    type Err = RgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Law::Linear),
            "sqrt" => Ok(Law::Sqrt),
            "log" => Ok(Law::Log),
            _ => Err(RgbError::InvalidParameter {
                param: "law".to_string(),
                message: format!("Unknown scaling law: {}", s),
            }),
        }
    }
}

/// Everything needed to scale one band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub law: Law,
    #[serde(default)]
    pub scale_min: Option<f64>,
    #[serde(default)]
    pub scale_max: Option<f64>,
    /// Divisor of `log10`, only meaningful for [`Law::Log`]
    #[serde(default)]
    pub factor: Option<f64>,
}

impl ScaleSpec {
    pub fn linear(scale_min: Option<f64>, scale_max: Option<f64>) -> Self {
        Self {
            law: Law::Linear,
            scale_min,
            scale_max,
            factor: None,
        }
    }

    pub fn sqrt(scale_min: Option<f64>, scale_max: Option<f64>) -> Self {
        Self {
            law: Law::Sqrt,
            scale_min,
            scale_max,
            factor: None,
        }
    }

    pub fn log(scale_min: Option<f64>, scale_max: Option<f64>, factor: f64) -> Self {
        Self {
            law: Law::Log,
            scale_min,
            scale_max,
            factor: Some(factor),
        }
    }

    /// Scale `band` according to this spec
    pub fn apply(&self, band: ArrayView2<f64>) -> Array2<f64> {
        match self.law {
            Law::Linear => linear(band, self.scale_min, self.scale_max),
            Law::Sqrt => sqrt(band, self.scale_min, self.scale_max),
            Law::Log => log(
                band,
                self.scale_min,
                self.scale_max,
                self.factor.unwrap_or(DEFAULT_LOG_FACTOR),
            ),
        }
    }
}
