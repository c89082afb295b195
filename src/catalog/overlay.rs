//! Catalog rows to pixel-space ellipses.
//!
//! Each row is mapped on its own: a row that cannot be placed (no axis
//! lengths, unprojectable position, unusable angle) is skipped with a warning
//! and the remaining rows are still mapped. A catalog that returns nothing at
//! all is an error for that catalog alone.

use serde::Serialize;
use tracing::{debug, warn};

use super::{AnglePolicy, CatalogQuery, CatalogRow, CatalogSurvey, PositionAngle};
use crate::error::{Result, RgbError};
use crate::wcs::{SkyField, WorldToPixel};

/// Offset between catalog position angles and the renderer's angle convention
pub const ANGLE_OFFSET_DEG: f64 = 90.0;

/// Convert an angular size in arcseconds to pixels, rounded to 2 decimals.
///
/// `field_radius_deg` is the side of the square image and `image_px` the
/// number of pixels along it.
pub fn arcsec_to_pixel(value_arcsec: f64, field_radius_deg: f64, image_px: usize) -> f64 {
    let pixel_scale = image_px as f64 / field_radius_deg;
    ((value_arcsec / 3600.0) * pixel_scale * 100.0).round_ties_even() / 100.0
}

/// Renderer angle for a catalog position angle, `None` if the row is unusable
pub fn pixel_angle(policy: AnglePolicy, angle: PositionAngle) -> Option<f64> {
    match angle {
        PositionAngle::Degrees(v) if v == 0.0 && policy.zero_is_missing => Some(ANGLE_OFFSET_DEG),
        PositionAngle::Degrees(v) => Some(v + ANGLE_OFFSET_DEG),
        PositionAngle::Masked if policy.masked_is_missing => Some(ANGLE_OFFSET_DEG),
        PositionAngle::Masked => None,
        PositionAngle::Absent => Some(ANGLE_OFFSET_DEG),
    }
}

/// One annotated source in pixel space
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EllipseDescriptor {
    /// 1-based label drawn next to the source
    pub label: usize,
    pub x: f64,
    pub y: f64,
    pub half_width_px: f64,
    pub half_height_px: f64,
    pub angle_deg: f64,
    pub flux: Option<f64>,
    pub flux_err: Option<f64>,
    pub unit: String,
}

/// All ellipses of one catalog, plus the rows that had to be skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogOverlay {
    pub catalog: CatalogSurvey,
    pub color: &'static str,
    pub ellipses: Vec<EllipseDescriptor>,
    pub skipped: Vec<String>,
}

/// Map a single row; `index` is 0-based
pub fn map_row(
    catalog: CatalogSurvey,
    index: usize,
    row: &CatalogRow,
    wcs: &dyn WorldToPixel,
    field: &SkyField,
) -> Result<EllipseDescriptor> {
    let geometry_error = |message: &str| RgbError::CatalogGeometry {
        catalog: catalog.tag().to_string(),
        row: index + 1,
        message: message.to_string(),
    };

    let major = row
        .major_arcsec
        .filter(|v| v.is_finite())
        .ok_or_else(|| geometry_error("missing major axis"))?;
    let minor = row
        .minor_arcsec
        .filter(|v| v.is_finite())
        .ok_or_else(|| geometry_error("missing minor axis"))?;
    let angle_deg = pixel_angle(catalog.angle_policy(), row.position_angle)
        .ok_or_else(|| geometry_error("masked position angle"))?;
    let (x, y) = wcs
        .world_to_pixel(row.ra_deg, row.dec_deg)
        .ok_or_else(|| geometry_error("position cannot be projected"))?;

    Ok(EllipseDescriptor {
        label: index + 1,
        x,
        y,
        half_width_px: arcsec_to_pixel(major, field.radius_deg, field.px),
        half_height_px: arcsec_to_pixel(minor, field.radius_deg, field.px),
        angle_deg,
        flux: row.flux,
        flux_err: row.flux_err,
        unit: row.unit.clone(),
    })
}

/// Map every row, skipping the ones that fail
pub fn map_catalog(
    catalog: CatalogSurvey,
    rows: &[CatalogRow],
    wcs: &dyn WorldToPixel,
    field: &SkyField,
) -> CatalogOverlay {
    let mut ellipses = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match map_row(catalog, index, row, wcs, field) {
            Ok(ellipse) => ellipses.push(ellipse),
            Err(e) => {
                warn!(catalog = catalog.tag(), error = %e, "Skipping catalog row");
                skipped.push(e.to_string());
            }
        }
    }

    debug!(
        catalog = catalog.tag(),
        mapped = ellipses.len(),
        skipped = skipped.len(),
        "Catalog mapped"
    );

    CatalogOverlay {
        catalog,
        color: catalog.color(),
        ellipses,
        skipped,
    }
}

/// Query and map one catalog
pub fn overlay_catalog(
    catalog: CatalogSurvey,
    query: &dyn CatalogQuery,
    wcs: &dyn WorldToPixel,
    field: &SkyField,
) -> Result<CatalogOverlay> {
    let rows = query.query(catalog, field).map_err(|e| RgbError::Catalog {
        catalog: catalog.tag().to_string(),
        message: e.to_string(),
    })?;

    if rows.is_empty() {
        return Err(RgbError::Catalog {
            catalog: catalog.tag().to_string(),
            message: "no data in catalog".to_string(),
        });
    }

    Ok(map_catalog(catalog, &rows, wcs, field))
}

/// Flux and flux-error entries, e.g. `S_TGSS-1` / `S_TGSS_e-1`
pub fn flux_text(overlay: &CatalogOverlay) -> Vec<(String, String)> {
    let tag = overlay.catalog.tag();
    let fmt = |v: Option<f64>, unit: &str| match v {
        Some(v) => format!("{:?} {}", v, unit),
        None => format!("-- {}", unit),
    };

    overlay
        .ellipses
        .iter()
        .flat_map(|e| {
            let err = e.flux_err.map(|v| (v * 1000.0).round() / 1000.0);
            [
                (format!("S_{}-{}", tag, e.label), fmt(e.flux, &e.unit)),
                (format!("S_{}_e-{}", tag, e.label), fmt(err, &e.unit)),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wcs::LinearWcs;

    fn field() -> SkyField {
        SkyField::new(150.0, 2.0, 1.0, 480).unwrap()
    }

    fn row(major: Option<f64>, angle: PositionAngle) -> CatalogRow {
        CatalogRow {
            ra_deg: 150.0,
            dec_deg: 2.0,
            major_arcsec: major,
            minor_arcsec: Some(18.0),
            position_angle: angle,
            flux: Some(424.0),
            flux_err: Some(42.6123),
            unit: "mJy".to_string(),
        }
    }

    #[test]
    fn test_arcsec_to_pixel() {
        assert_eq!(arcsec_to_pixel(3600.0, 1.0, 480), 480.0);
        assert_eq!(arcsec_to_pixel(45.0, 0.12, 480), 50.0);
        assert_eq!(arcsec_to_pixel(10.0, 0.12, 480), 11.11);
    }

    #[test]
    fn test_pixel_angle_policies() {
        let tgss = CatalogSurvey::Tgss.angle_policy();
        let nvss = CatalogSurvey::Nvss.angle_policy();

        assert_eq!(pixel_angle(tgss, PositionAngle::Degrees(30.0)), Some(120.0));
        assert_eq!(pixel_angle(nvss, PositionAngle::Degrees(30.0)), Some(120.0));
        assert_eq!(pixel_angle(nvss, PositionAngle::Degrees(0.0)), Some(90.0));
        assert_eq!(pixel_angle(nvss, PositionAngle::Masked), Some(90.0));
        assert_eq!(pixel_angle(tgss, PositionAngle::Masked), None);
        assert_eq!(pixel_angle(tgss, PositionAngle::Absent), Some(90.0));
    }

    #[test]
    fn test_map_row_geometry() {
        let field = field();
        let wcs = LinearWcs::for_field(&field);
        let e = map_row(
            CatalogSurvey::Tgss,
            0,
            &row(Some(36.0), PositionAngle::Degrees(-10.0)),
            &wcs,
            &field,
        )
        .unwrap();

        assert_eq!(e.label, 1);
        assert_eq!(e.half_width_px, 4.8);
        assert_eq!(e.half_height_px, 2.4);
        assert_eq!(e.angle_deg, 80.0);
        assert!((e.x - 239.5).abs() < 1e-9);
    }

    #[test]
    fn test_bad_row_does_not_stop_the_rest() {
        let field = field();
        let wcs = LinearWcs::for_field(&field);
        let rows = vec![
            row(None, PositionAngle::Absent),
            row(Some(36.0), PositionAngle::Masked),
            row(Some(36.0), PositionAngle::Absent),
        ];

        let overlay = map_catalog(CatalogSurvey::Tgss, &rows, &wcs, &field);
        assert_eq!(overlay.ellipses.len(), 1);
        assert_eq!(overlay.ellipses[0].label, 3);
        assert_eq!(overlay.skipped.len(), 2);

        let overlay = map_catalog(CatalogSurvey::Nvss, &rows, &wcs, &field);
        assert_eq!(overlay.ellipses.len(), 2);
    }

    #[test]
    fn test_flux_text() {
        let field = field();
        let wcs = LinearWcs::for_field(&field);
        let overlay = map_catalog(
            CatalogSurvey::Nvss,
            &[row(Some(36.0), PositionAngle::Absent)],
            &wcs,
            &field,
        );
        assert_eq!(
            flux_text(&overlay),
            vec![
                ("S_NVSS-1".to_string(), "424.0 mJy".to_string()),
                ("S_NVSS_e-1".to_string(), "42.612 mJy".to_string()),
            ]
        );
    }
}
