//! Radio source catalogs and their conventions.
//!
//! Catalog rows arrive from an external VizieR query. Each catalog has its
//! own column names and its own idea of what an unusable position angle looks
//! like; those differences live in the small tables on [`CatalogSurvey`] so the
//! ellipse geometry in [`overlay`] stays survey-agnostic.

pub mod overlay;

pub use overlay::{
    arcsec_to_pixel, flux_text, map_catalog, map_row, overlay_catalog, CatalogOverlay,
    EllipseDescriptor,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::wcs::SkyField;

/// Catalogs with ellipse overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSurvey {
    Tgss,
    Nvss,
}

/// When a catalog position angle counts as "no data"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnglePolicy {
    /// An angle of exactly 0 means the catalog has no measurement
    pub zero_is_missing: bool,
    /// A masked (`--`) angle falls back to the default instead of failing the row
    pub masked_is_missing: bool,
}

impl CatalogSurvey {
    pub const ALL: [CatalogSurvey; 2] = [CatalogSurvey::Tgss, CatalogSurvey::Nvss];

    /// Upper-case tag used in flux labels
    pub fn tag(&self) -> &'static str {
        match self {
            CatalogSurvey::Tgss => "TGSS",
            CatalogSurvey::Nvss => "NVSS",
        }
    }

    /// VizieR catalog identifier
    pub fn vizier_catalog(&self) -> &'static str {
        match self {
            CatalogSurvey::Tgss => "J/A+A/598/A78/table3",
            CatalogSurvey::Nvss => "VIII/65/nvss",
        }
    }

    /// Columns requested from VizieR
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            CatalogSurvey::Tgss => &["RAJ2000", "DEJ2000", "Maj", "Min", "PA", "Stotal", "e_Stotal"],
            CatalogSurvey::Nvss => &[
                "RAJ2000", "DEJ2000", "MajAxis", "MinAxis", "PA", "+NVSS", "S1.4", "e_S1.4",
            ],
        }
    }

    pub fn angle_policy(&self) -> AnglePolicy {
        match self {
            CatalogSurvey::Tgss => AnglePolicy {
                zero_is_missing: false,
                masked_is_missing: false,
            },
            CatalogSurvey::Nvss => AnglePolicy {
                zero_is_missing: true,
                masked_is_missing: true,
            },
        }
    }

    /// Edge color the renderer draws this catalog with
    pub fn color(&self) -> &'static str {
        match self {
            CatalogSurvey::Tgss => "magenta",
            CatalogSurvey::Nvss => "cyan",
        }
    }
}

impl fmt::Display for CatalogSurvey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Position angle cell as it appears in JSON: a number or a masked string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAngle {
    Degrees(f64),
    Text(String),
}

/// Position angle cell of a catalog row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<RawAngle>", into = "Option<RawAngle>")]
pub enum PositionAngle {
    Degrees(f64),
    /// The column exists but this cell is masked (`--`)
    Masked,
    /// The catalog has no position angle column
    #[default]
    Absent,
}

impl From<Option<RawAngle>> for PositionAngle {
    fn from(raw: Option<RawAngle>) -> Self {
        match raw {
            None => PositionAngle::Absent,
            Some(RawAngle::Degrees(v)) if v.is_finite() => PositionAngle::Degrees(v),
            Some(RawAngle::Degrees(_)) => PositionAngle::Masked,
            Some(RawAngle::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(PositionAngle::Degrees)
                .unwrap_or(PositionAngle::Masked),
        }
    }
}

impl From<PositionAngle> for Option<RawAngle> {
    fn from(angle: PositionAngle) -> Self {
        match angle {
            PositionAngle::Degrees(v) => Some(RawAngle::Degrees(v)),
            PositionAngle::Masked => Some(RawAngle::Text("--".to_string())),
            PositionAngle::Absent => None,
        }
    }
}

/// One source row as delivered by the catalog query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default)]
    pub major_arcsec: Option<f64>,
    #[serde(default)]
    pub minor_arcsec: Option<f64>,
    #[serde(default)]
    pub position_angle: PositionAngle,
    #[serde(default)]
    pub flux: Option<f64>,
    #[serde(default)]
    pub flux_err: Option<f64>,
    #[serde(default = "default_flux_unit")]
    pub unit: String,
}

fn default_flux_unit() -> String {
    "mJy".to_string()
}

/// Source of catalog rows within a field
pub trait CatalogQuery {
    fn query(&self, catalog: CatalogSurvey, field: &SkyField) -> Result<Vec<CatalogRow>>;
}
