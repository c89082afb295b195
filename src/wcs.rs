//! Sky fields and the world-to-pixel seam.
//!
//! Real projections come from the FITS headers of the fetched images and are
//! supplied by the caller through [`WorldToPixel`]. [`LinearWcs`] is a plain
//! reference-pixel mapping, good enough for the small fields rgbmaker works on
//! and for offline bundles.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RgbError};

/// Largest field the archive is asked for, in degrees
pub const MAX_RADIUS_DEG: f64 = 2.0;

/// Centre and size of the requested square field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyField {
    pub ra_deg: f64,
    pub dec_deg: f64,
    /// Side of the square field in degrees
    pub radius_deg: f64,
    /// Pixels along each side
    pub px: usize,
}

impl SkyField {
    pub fn new(ra_deg: f64, dec_deg: f64, radius_deg: f64, px: usize) -> Result<Self> {
        if !(-90.0..=90.0).contains(&dec_deg) || !ra_deg.is_finite() {
            return Err(RgbError::InvalidParameter {
                param: "position".to_string(),
                message: format!("Please check coordinates ({}, {})", ra_deg, dec_deg),
            });
        }
        if !(radius_deg > 0.0) {
            return Err(RgbError::InvalidParameter {
                param: "radius".to_string(),
                message: format!("Radius must be positive, got {}", radius_deg),
            });
        }
        if px == 0 {
            return Err(RgbError::InvalidParameter {
                param: "px".to_string(),
                message: "Image must have at least one pixel".to_string(),
            });
        }

        Ok(Self {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg,
            radius_deg: radius_deg.min(MAX_RADIUS_DEG),
            px,
        })
    }

    /// Centre as sexagesimal text, e.g. `14h09m48.864s -03d02m32.60s`
    pub fn to_hmsdms(&self) -> String {
        let ra_ms = (self.ra_deg / 15.0 * 3_600_000.0).round() as u64 % (24 * 3_600_000);
        let (h, rem) = (ra_ms / 3_600_000, ra_ms % 3_600_000);
        let (m, s) = (rem / 60_000, (rem % 60_000) as f64 / 1000.0);

        let sign = if self.dec_deg < 0.0 { '-' } else { '+' };
        let dec_cs = (self.dec_deg.abs() * 360_000.0).round() as u64;
        let (d, rem) = (dec_cs / 360_000, dec_cs % 360_000);
        let (dm, ds) = (rem / 6_000, (rem % 6_000) as f64 / 100.0);

        format!(
            "{:02}h{:02}m{:06.3}s {}{:02}d{:02}m{:05.2}s",
            h, m, s, sign, d, dm, ds
        )
    }
}

/// Projection from sky coordinates (degrees) to pixel coordinates
pub trait WorldToPixel {
    /// Pixel `(x, y)` of a sky position, `None` when it cannot be projected
    fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> Option<(f64, f64)>;
}

/// Reference-pixel linear mapping with a `cos(dec)` correction on RA
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearWcs {
    pub crval: (f64, f64),
    pub crpix: (f64, f64),
    /// Degrees per pixel; RA is negative so east is to the left
    pub cdelt: (f64, f64),
}

impl LinearWcs {
    /// Mapping for a field centred on its own reference pixel
    pub fn for_field(field: &SkyField) -> Self {
        let scale = field.radius_deg / field.px as f64;
        let centre = (field.px as f64 - 1.0) / 2.0;
        Self {
            crval: (field.ra_deg, field.dec_deg),
            crpix: (centre, centre),
            cdelt: (-scale, scale),
        }
    }
}

impl WorldToPixel for LinearWcs {
    fn world_to_pixel(&self, ra_deg: f64, dec_deg: f64) -> Option<(f64, f64)> {
        if self.cdelt.0 == 0.0 || self.cdelt.1 == 0.0 {
            return None;
        }

        let mut dra = ra_deg - self.crval.0;
        if dra > 180.0 {
            dra -= 360.0;
        } else if dra < -180.0 {
            dra += 360.0;
        }
        let dra = dra * self.crval.1.to_radians().cos();

        let x = self.crpix.0 + dra / self.cdelt.0;
        let y = self.crpix.1 + (dec_deg - self.crval.1) / self.cdelt.1;
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }
}
