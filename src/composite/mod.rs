//! RGB compositing.
//!
//! Three co-registered bands become one 8-bit raster. Two algorithms exist:
//! the contour composite ([`overlayc`]), which normalizes every channel the
//! same way and pairs the raster with contour levels, and the direct
//! composite ([`overlayo`]), whose per-channel scaling comes from the recipe
//! table in [`recipe`].

pub mod contour;
pub mod direct;
pub mod raster;
pub mod recipe;

pub use contour::overlayc;
pub use direct::overlayo;
pub use raster::{quantize, RgbRaster};
pub use recipe::{Algorithm, Bound, ChannelTemplate, Prepare, Quantize, Recipe};

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::band;
use crate::error::Result;

/// Position of a band in the output raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Index along the last raster axis
    pub fn index(&self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Render three bands through `recipe`'s channel table
pub fn compose(
    recipe: Recipe,
    red: ArrayView2<f64>,
    green: ArrayView2<f64>,
    blue: ArrayView2<f64>,
) -> Result<RgbRaster> {
    band::ensure_same_shape(&[red.dim(), green.dim(), blue.dim()])?;

    let r = recipe.channel(Channel::Red).render(red);
    let g = recipe.channel(Channel::Green).render(green);
    let b = recipe.channel(Channel::Blue).render(blue);

    RgbRaster::from_channels(&r, &g, &b)
}
