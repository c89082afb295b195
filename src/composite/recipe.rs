//! Composite recipes and their per-channel scaling table.
//!
//! Every `(recipe, channel)` pair maps to one [`ChannelTemplate`] describing
//! how the raw band is prepared, which law scales it, where the bounds come
//! from and how the result is quantized. The brightness normalization differs
//! per channel on purpose; changing it changes the look of published images.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::raster::quantize;
use super::Channel;
use crate::band;
use crate::error::RgbError;
use crate::normalize::normalize;
use crate::scaling::{Law, ScaleSpec};
use crate::survey::Survey;

/// Which compositing algorithm a recipe uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Normalize, sqrt-scale from a tenth of the stddev, pair with contours
    Contour,
    /// Percentile-bounded scaling straight from the raw band
    Direct,
}

/// A named channel assignment plus scaling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipe {
    #[serde(rename = "ROR-contour")]
    RorContour,
    #[serde(rename = "IOU-contour")]
    IouContour,
    #[serde(rename = "IOU")]
    Iou,
    #[serde(rename = "Optical")]
    Optical,
}

impl Recipe {
    pub fn id(&self) -> &'static str {
        match self {
            Recipe::RorContour => "ROR-contour",
            Recipe::IouContour => "IOU-contour",
            Recipe::Iou => "IOU",
            Recipe::Optical => "Optical",
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Recipe::RorContour | Recipe::IouContour => Algorithm::Contour,
            Recipe::Iou | Recipe::Optical => Algorithm::Direct,
        }
    }

    /// Survey feeding each of red, green and blue
    pub fn bands(&self) -> [Survey; 3] {
        match self {
            Recipe::RorContour => [Survey::Tgss, Survey::Dss2r, Survey::Nvss],
            Recipe::IouContour | Recipe::Iou => [Survey::W22, Survey::Dss2r, Survey::Gnuv],
            Recipe::Optical => [Survey::Dss2ir, Survey::Dss2r, Survey::Dss2b],
        }
    }

    pub fn band(&self, channel: Channel) -> Survey {
        self.bands()[channel.index()]
    }

    /// The scaling table
    pub fn channel(&self, channel: Channel) -> ChannelTemplate {
        use Channel::*;

        match (self, channel) {
            (Recipe::RorContour | Recipe::IouContour, _) => ChannelTemplate::CONTOUR,

            (Recipe::Iou, Red) => ChannelTemplate {
                quantize: Quantize::ScaledByPeak(255.0),
                ..ChannelTemplate::sqrt(Bound::Percentile(1.0), Bound::Percentile(100.0))
            },
            (Recipe::Iou, Green) => ChannelTemplate {
                quantize: Quantize::DividedByPeak(255.0),
                ..ChannelTemplate::sqrt(Bound::Percentile(1.0), Bound::Percentile(100.0))
            },
            (Recipe::Iou, Blue) => ChannelTemplate {
                law: Law::Log,
                lower: Bound::Percentile(5.0),
                upper: Bound::Percentile(100.0),
                factor: Some(3.15),
                quantize: Quantize::Fixed(255.0),
                ..ChannelTemplate::CONTOUR
            }
            .raw(),

            (Recipe::Optical, Red) => ChannelTemplate {
                quantize: Quantize::ScaledByPeak(255.0),
                ..ChannelTemplate::sqrt(Bound::MinTimes(1.0), Bound::Percentile(100.0))
            },
            (Recipe::Optical, Green) => ChannelTemplate {
                quantize: Quantize::Fixed(255.99),
                ..ChannelTemplate::sqrt(Bound::MinTimes(1.15), Bound::Percentile(100.0))
            },
            (Recipe::Optical, Blue) => ChannelTemplate {
                quantize: Quantize::Fixed(256.0),
                ..ChannelTemplate::sqrt(Bound::MinTimes(1.0), Bound::Percentile(100.0))
            },
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Recipe {
    type Err = RgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ror-contour" | "ror" => Ok(Recipe::RorContour),
            "iou-contour" => Ok(Recipe::IouContour),
            "iou" => Ok(Recipe::Iou),
            "optical" => Ok(Recipe::Optical),
            _ => Err(RgbError::InvalidParameter {
                param: "recipe".to_string(),
                message: format!("Unknown recipe: {}", s),
            }),
        }
    }
}

/// Where a scaling bound is read from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Percentile (0-100) of the distinct pixel values
    Percentile(f64),
    /// Multiple of the band minimum
    MinTimes(f64),
    /// Multiple of the population standard deviation
    StdTimes(f64),
    Max,
}

impl Bound {
    pub fn resolve(&self, input: ArrayView2<f64>) -> f64 {
        match *self {
            Bound::Percentile(p) => band::percentile_of_unique(input, p),
            Bound::MinTimes(k) => k * band::min(input),
            Bound::StdTimes(k) => k * band::std_dev(input),
            Bound::Max => band::max(input),
        }
    }
}

/// What happens to the raw band before scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepare {
    Raw,
    /// Median-centre and max-normalize first
    Normalize,
}

/// How a scaled channel becomes `u8`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantize {
    /// `v * k`
    Fixed(f64),
    /// `v * (k / peak)`
    ScaledByPeak(f64),
    /// `v * k / peak`
    DividedByPeak(f64),
}

/// Complete recipe for one output channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelTemplate {
    pub prepare: Prepare,
    /// Leave the prepared band unscaled when its max or min is exactly zero
    pub skip_zero_extremes: bool,
    pub law: Law,
    pub lower: Bound,
    pub upper: Bound,
    pub factor: Option<f64>,
    /// Truncate values above 1 before quantizing
    pub clip_upper: bool,
    pub quantize: Quantize,
}

impl ChannelTemplate {
    /// Shared by every channel of the contour composites
    pub const CONTOUR: ChannelTemplate = ChannelTemplate {
        prepare: Prepare::Normalize,
        skip_zero_extremes: true,
        law: Law::Sqrt,
        lower: Bound::StdTimes(0.1),
        upper: Bound::Max,
        factor: None,
        clip_upper: true,
        quantize: Quantize::Fixed(255.99),
    };

    fn sqrt(lower: Bound, upper: Bound) -> Self {
        Self {
            lower,
            upper,
            ..Self::CONTOUR
        }
        .raw()
    }

    fn raw(self) -> Self {
        Self {
            prepare: Prepare::Raw,
            skip_zero_extremes: false,
            clip_upper: false,
            ..self
        }
    }

    /// Resolve the bounds against a prepared band
    pub fn spec_for(&self, prepared: ArrayView2<f64>) -> ScaleSpec {
        ScaleSpec {
            law: self.law,
            scale_min: Some(self.lower.resolve(prepared)),
            scale_max: Some(self.upper.resolve(prepared)),
            factor: self.factor,
        }
    }

    /// Prepare and scale, before clipping and quantization
    pub fn scale(&self, input: ArrayView2<f64>) -> Array2<f64> {
        let prepared = match self.prepare {
            Prepare::Raw => input.to_owned(),
            Prepare::Normalize => normalize(input),
        };

        if self.skip_zero_extremes {
            let view = prepared.view();
            if band::max(view) == 0.0 || band::min(view) == 0.0 {
                return prepared;
            }
        }

        self.spec_for(prepared.view()).apply(prepared.view())
    }

    /// Full channel pipeline down to `u8`
    pub fn render(&self, input: ArrayView2<f64>) -> Array2<u8> {
        let mut scaled = self.scale(input);
        if self.clip_upper {
            scaled.mapv_inplace(|v| if v > 1.0 { 1.0 } else { v });
        }

        match self.quantize {
            Quantize::Fixed(k) => quantize(scaled.view(), k),
            Quantize::ScaledByPeak(k) => {
                let multiplier = k / band::max(scaled.view());
                quantize(scaled.view(), multiplier)
            }
            Quantize::DividedByPeak(k) => {
                let peak = band::max(scaled.view());
                scaled.mapv(|v| (v * k / peak) as u8)
            }
        }
    }
}
