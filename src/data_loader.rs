//! Offline bundle loading.
//!
//! A bundle is a JSON snapshot of everything the archive and catalog
//! services would return for one field: bands as nested row arrays, catalog
//! rows, an optional linear WCS and an optional spectral-index table. Loaded
//! bundles stand in for the network collaborators of the pipeline.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::band::Band;
use crate::catalog::{CatalogQuery, CatalogRow, CatalogSurvey};
use crate::error::{Result, RgbError};
use crate::pipeline::BandFetcher;
use crate::spidx::SpidxTable;
use crate::survey::Survey;
use crate::wcs::{LinearWcs, SkyField};

/// On-disk layout of a bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleFile {
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default)]
    pub wcs: Option<LinearWcs>,
    /// Simulates an unreachable image archive
    #[serde(default)]
    pub server_down: bool,
    #[serde(default)]
    pub bands: BTreeMap<Survey, Vec<Vec<f64>>>,
    /// Resampling kernel each band was cut out with, where recorded
    #[serde(default)]
    pub samplers: BTreeMap<Survey, String>,
    #[serde(default)]
    pub catalogs: HashMap<CatalogSurvey, Vec<CatalogRow>>,
    #[serde(default)]
    pub spidx: Option<SpidxTable>,
}

/// A loaded bundle, usable as band and catalog source
#[derive(Debug, Clone)]
pub struct OfflineArchive {
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub wcs: Option<LinearWcs>,
    pub server_down: bool,
    pub bands: BTreeMap<Survey, Band>,
    pub samplers: BTreeMap<Survey, String>,
    pub catalogs: HashMap<CatalogSurvey, Vec<CatalogRow>>,
    pub spidx: Option<SpidxTable>,
}

impl OfflineArchive {
    /// Side length shared by all bands, `None` for a bundle without bands
    pub fn side_px(&self) -> Option<usize> {
        self.bands.values().next().map(|b| b.nrows())
    }

    /// The bundle's own WCS, or a linear one centred on `field`
    pub fn wcs_for(&self, field: &SkyField) -> LinearWcs {
        self.wcs.unwrap_or_else(|| LinearWcs::for_field(field))
    }
}

impl BandFetcher for OfflineArchive {
    fn fetch(&self, survey: Survey, _field: &SkyField) -> Result<Band> {
        if self.server_down {
            return Err(RgbError::ServerDown {
                message: "offline bundle marks the archive as down".to_string(),
            });
        }
        self.bands
            .get(&survey)
            .cloned()
            .ok_or_else(|| RgbError::BandUnavailable {
                survey: survey.to_string(),
            })
    }
}

impl CatalogQuery for OfflineArchive {
    fn query(&self, catalog: CatalogSurvey, _field: &SkyField) -> Result<Vec<CatalogRow>> {
        Ok(self.catalogs.get(&catalog).cloned().unwrap_or_default())
    }
}

/// Load a bundle file and check that its bands share one square grid
pub fn load_bundle(path: &Path) -> Result<OfflineArchive> {
    if !path.exists() {
        return Err(RgbError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let file: BundleFile = serde_json::from_str(&content)?;
    info!("Opened bundle: {}", path.display());

    let archive = from_bundle_file(file)?;
    validate_archive(&archive)?;

    debug!(
        bands = archive.bands.len(),
        catalogs = archive.catalogs.len(),
        spidx_points = archive.spidx.as_ref().map_or(0, |t| t.len()),
        "Bundle loaded"
    );
    Ok(archive)
}

/// Convert the on-disk layout into arrays
pub fn from_bundle_file(file: BundleFile) -> Result<OfflineArchive> {
    let bands = file
        .bands
        .into_iter()
        .map(|(survey, rows)| rows_to_band(survey, rows).map(|band| (survey, band)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(OfflineArchive {
        ra_deg: file.ra_deg,
        dec_deg: file.dec_deg,
        wcs: file.wcs,
        server_down: file.server_down,
        bands,
        samplers: file.samplers,
        catalogs: file.catalogs,
        spidx: file.spidx,
    })
}

/// Load a standalone spectral-index table (a JSON list of points)
pub fn load_spidx_table(path: &Path) -> Result<SpidxTable> {
    let content = std::fs::read_to_string(path)?;
    let table: SpidxTable = serde_json::from_str(&content)?;
    info!("Loaded {} spectral indices from {}", table.len(), path.display());
    Ok(table)
}

/// Nested rows into a 2-D array; rows must all have the same length
fn rows_to_band(survey: Survey, rows: Vec<Vec<f64>>) -> Result<Band> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, |r| r.len());

    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(RgbError::InvalidParameter {
            param: survey.to_string(),
            message: format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                ncols
            ),
        });
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|e| RgbError::InvalidParameter {
        param: survey.to_string(),
        message: format!("Failed to build band array: {}", e),
    })
}

/// Every band must be square, non-empty and on the same grid
fn validate_archive(archive: &OfflineArchive) -> Result<()> {
    let Some(side) = archive.side_px() else {
        return Ok(());
    };

    for (survey, band) in &archive.bands {
        if band.dim() != (side, side) {
            return Err(RgbError::ShapeMismatch {
                expected: (side, side),
                found: band.dim(),
            });
        }
        if side == 0 {
            return Err(RgbError::InvalidParameter {
                param: survey.to_string(),
                message: "band is empty".to_string(),
            });
        }
    }

    // A band cut out with another kernel than the live archive would use
    // does not match what the pipeline expects
    for (survey, kernel) in &archive.samplers {
        if let Some(expected) = survey.sampler() {
            if !kernel.eq_ignore_ascii_case(expected) {
                return Err(RgbError::InvalidParameter {
                    param: survey.to_string(),
                    message: format!("resampled with {}, expected {}", kernel, expected),
                });
            }
        }
    }

    SkyField::new(archive.ra_deg, archive.dec_deg, 1.0, side)?;
    Ok(())
}
