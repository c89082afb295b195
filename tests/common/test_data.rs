//! Synthetic survey data.
//!
//! Bands with known patterns, plus in-memory stand-ins for the image archive
//! and the catalog service.

use ndarray::Array2;
use rgbmaker::catalog::{CatalogQuery, CatalogRow, CatalogSurvey, PositionAngle};
use rgbmaker::data_loader::BundleFile;
use rgbmaker::pipeline::BandFetcher;
use rgbmaker::wcs::SkyField;
use rgbmaker::{Result, RgbError, Survey};
use std::collections::{BTreeMap, HashMap};

/// Row-major ramp from `peak / n` up to `peak`
pub fn gradient_band(px: usize, peak: f64) -> Array2<f64> {
    let n = (px * px) as f64;
    Array2::from_shape_fn((px, px), |(i, j)| peak * ((i * px + j) as f64 + 1.0) / n)
}

/// Flat background with one bright pixel in the centre
pub fn point_source_band(px: usize, background: f64, peak: f64) -> Array2<f64> {
    let mut band = Array2::from_elem((px, px), background);
    band[[px / 2, px / 2]] = peak;
    band
}

/// Typical peak brightness of each survey, in its native units
pub fn survey_peak(survey: Survey) -> f64 {
    match survey {
        Survey::Tgss => 0.4,
        Survey::Nvss => 0.06,
        Survey::First => 0.01,
        Survey::Gnuv => 0.05,
        _ => 12000.0,
    }
}

/// Image archive serving gradients, with selectable gaps
pub struct FakeArchive {
    pub missing: Vec<Survey>,
    pub down: bool,
}

impl FakeArchive {
    pub fn complete() -> Self {
        Self {
            missing: Vec::new(),
            down: false,
        }
    }

    pub fn without(missing: &[Survey]) -> Self {
        Self {
            missing: missing.to_vec(),
            down: false,
        }
    }
}

impl BandFetcher for FakeArchive {
    fn fetch(&self, survey: Survey, field: &SkyField) -> Result<Array2<f64>> {
        if self.down {
            return Err(RgbError::ServerDown {
                message: "connection refused".to_string(),
            });
        }
        if self.missing.contains(&survey) {
            return Err(RgbError::BandUnavailable {
                survey: survey.to_string(),
            });
        }
        Ok(gradient_band(field.px, survey_peak(survey)))
    }
}

/// Catalog service with fixed rows per catalog; absent catalogs fail
pub struct FakeCatalogs {
    pub rows: HashMap<CatalogSurvey, Vec<CatalogRow>>,
}

impl CatalogQuery for FakeCatalogs {
    fn query(&self, catalog: CatalogSurvey, _field: &SkyField) -> Result<Vec<CatalogRow>> {
        self.rows
            .get(&catalog)
            .cloned()
            .ok_or_else(|| RgbError::Catalog {
                catalog: catalog.tag().to_string(),
                message: "service unavailable".to_string(),
            })
    }
}

/// A resolved source at `(ra, dec)`
pub fn source_row(ra_deg: f64, dec_deg: f64, angle: PositionAngle, flux: f64) -> CatalogRow {
    CatalogRow {
        ra_deg,
        dec_deg,
        major_arcsec: Some(45.0),
        minor_arcsec: Some(36.0),
        position_angle: angle,
        flux: Some(flux),
        flux_err: Some(flux / 10.0),
        unit: "mJy".to_string(),
    }
}

/// Bundle with gradient bands for `surveys`
pub fn gradient_bundle(ra_deg: f64, dec_deg: f64, px: usize, surveys: &[Survey]) -> BundleFile {
    let bands: BTreeMap<Survey, Vec<Vec<f64>>> = surveys
        .iter()
        .map(|&s| {
            let band = gradient_band(px, survey_peak(s));
            (s, band.outer_iter().map(|row| row.to_vec()).collect())
        })
        .collect();
    let samplers = surveys
        .iter()
        .filter_map(|&s| s.sampler().map(|k| (s, k.to_string())))
        .collect();

    BundleFile {
        ra_deg,
        dec_deg,
        bands,
        samplers,
        ..Default::default()
    }
}
