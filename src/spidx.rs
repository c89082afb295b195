//! Spectral index lookup.
//!
//! A spectral-index table is a flat list of `(RA, Dec, index)` points loaded
//! by the caller. Lookups are a two-stage box filter around a target: first
//! on declination, then on right ascension within those rows. No spherical
//! correction is applied; the window is meant to be a few arcminutes.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reference frequencies (MHz) of TGSS and NVSS
pub const TGSS_NVSS_FREQ_MHZ: [f64; 2] = [150.0, 1420.0];

/// One precomputed spectral index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpidxPoint {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub index: f64,
}

impl From<(f64, f64, f64)> for SpidxPoint {
    fn from((ra_deg, dec_deg, index): (f64, f64, f64)) -> Self {
        Self {
            ra_deg,
            dec_deg,
            index,
        }
    }
}

/// In-memory spectral-index catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpidxTable {
    points: Vec<SpidxPoint>,
}

/// Parallel columns of the points found in a window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpidxMatches {
    pub ra: Vec<f64>,
    pub dec: Vec<f64>,
    /// Rounded to 3 decimals
    pub index: Vec<f64>,
}

impl SpidxMatches {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl SpidxTable {
    pub fn new(points: Vec<SpidxPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SpidxPoint] {
        &self.points
    }

    /// Points with `|Dec - center_dec| < epsilon` and `|RA - center_ra| < epsilon`
    pub fn find_in_window(&self, center_ra: f64, center_dec: f64, epsilon_deg: f64) -> SpidxMatches {
        debug!(
            window_arcmin = epsilon_deg * 60.0,
            "Searching spectral index table"
        );

        let mut matches = SpidxMatches::default();
        for p in self
            .points
            .iter()
            .filter(|p| (p.dec_deg - center_dec).abs() < epsilon_deg)
            .filter(|p| (p.ra_deg - center_ra).abs() < epsilon_deg)
        {
            matches.ra.push(p.ra_deg);
            matches.dec.push(p.dec_deg);
            matches.index.push((p.index * 1000.0).round() / 1000.0);
        }
        matches
    }
}

impl FromIterator<SpidxPoint> for SpidxTable {
    fn from_iter<I: IntoIterator<Item = SpidxPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Convenience wrapper over [`SpidxTable::find_in_window`]
pub fn find_in_window(
    table: &SpidxTable,
    center_ra: f64,
    center_dec: f64,
    epsilon_deg: f64,
) -> SpidxMatches {
    table.find_in_window(center_ra, center_dec, epsilon_deg)
}

/// Two-point spectral index between fluxes at two frequencies, to 3 decimals
pub fn two_point_index(flux_low: f64, flux_high: f64, freq_mhz: [f64; 2]) -> f64 {
    let ratio = freq_mhz[0] / freq_mhz[1];
    let si = (flux_low / flux_high + 1e-5).ln() / (ratio + 1e-5).ln();
    (si * 1000.0).round() / 1000.0
}
