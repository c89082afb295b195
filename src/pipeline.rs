//! Query pipeline.
//!
//! Fetches the bands a figure set needs, builds its composites, contour
//! levels and catalog overlays, and collects them into a [`QueryOutput`].
//! Drawing axes, contour lines and ellipses is left to the renderer; the
//! output carries everything it needs in pixel space.
//!
//! A band the archive cannot deliver is replaced by a zero-filled placeholder
//! and every panel built on it is skipped and reported. Catalog failures only
//! drop their own overlay. The only thing that aborts a query is an
//! unreachable image archive.

use ndarray::ArrayView2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::band::{self, Band};
use crate::catalog::{flux_text, overlay_catalog, CatalogOverlay, CatalogQuery, CatalogSurvey};
use crate::composite::{overlayc, overlayo, Recipe, RgbRaster};
use crate::config::Config;
use crate::contour::{levels, round_levels};
use crate::error::{Result, RgbError};
use crate::logging::{
    generate_request_id, log_band_stats, log_operation_end, log_operation_start,
    log_timed_operation,
};
use crate::scaling::ScaleSpec;
use crate::spidx::SpidxTable;
use crate::survey::{plan_surveys, ImagesOption, Survey};
use crate::wcs::{SkyField, WorldToPixel};

/// Fixed part of the credit line drawn on every annotated panel
pub const CREDIT_TAG: &str = "#RADatHomeIndia";

/// Source of survey images
pub trait BandFetcher {
    /// Image of `survey` over `field`, resampled with `survey.sampler()`
    /// where it names a kernel.
    ///
    /// [`RgbError::BandUnavailable`] marks a band the archive has no data for;
    /// [`RgbError::ServerDown`] aborts the whole query.
    fn fetch(&self, survey: Survey, field: &SkyField) -> Result<Band>;
}

/// Name shown in the credit line: short names become `Anonymous`, long ones
/// are cut to 28 characters
pub fn sanitize_name(name: &str) -> String {
    let name = name.trim();
    let count = name.chars().count();
    if count <= 2 {
        "Anonymous".to_string()
    } else if count > 27 {
        name.chars().take(28).collect()
    } else {
        name.to_string()
    }
}

/// A sanitized query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub name: String,
    pub field: SkyField,
    pub images: ImagesOption,
    pub contour_levels: usize,
    pub annotate: bool,
}

impl QueryParams {
    pub fn new(name: &str, field: SkyField, images: ImagesOption) -> Self {
        Self {
            name: sanitize_name(name),
            field,
            images,
            contour_levels: crate::contour::DEFAULT_LEVEL_COUNT,
            annotate: true,
        }
    }

    /// Query for the field centred on `(ra_deg, dec_deg)` using the configured
    /// name, radius, size and figure set
    pub fn from_config(config: &Config, ra_deg: f64, dec_deg: f64) -> Result<Self> {
        let field = SkyField::new(ra_deg, dec_deg, config.query.radius, config.query.px)?;
        Ok(Self {
            name: sanitize_name(&config.query.name),
            field,
            images: config.images_option()?,
            contour_levels: config.query.contour_levels,
            annotate: config.output.annotate,
        })
    }
}

/// Overall outcome of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Info,
    Warning,
}

/// Contour lines to draw over a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContourSet {
    pub survey: Survey,
    pub color: &'static str,
    pub levels: Vec<f64>,
}

/// Free text placed at a pixel position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Credit line of an annotated panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credit {
    pub tag: &'static str,
    pub author: String,
}

/// One image with everything drawn on top of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    #[serde(skip)]
    pub raster: RgbRaster,
    pub contours: Vec<ContourSet>,
    pub catalogs: Vec<CatalogOverlay>,
    pub labels: Vec<Label>,
    pub credit: Option<Credit>,
}

impl Panel {
    fn new(title: &str, raster: RgbRaster, params: &QueryParams) -> Self {
        Self {
            title: title.to_string(),
            raster,
            contours: Vec::new(),
            catalogs: Vec::new(),
            labels: Vec::new(),
            credit: params.annotate.then(|| Credit {
                tag: CREDIT_TAG,
                author: format!("By {}", params.name),
            }),
        }
    }

    fn with_contours(mut self, survey: Survey, color: &'static str, lvl: &Option<Vec<f64>>) -> Self {
        if let Some(levels) = lvl {
            self.contours.push(ContourSet {
                survey,
                color,
                levels: levels.clone(),
            });
        }
        self
    }
}

/// Panels shown side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub id: String,
    pub panels: Vec<Panel>,
}

/// Result of a query
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    pub status: Status,
    pub info: String,
    pub figures: Vec<Figure>,
    /// Ordered key/value report: target, band ranges, levels, fluxes
    pub text: Vec<(String, String)>,
    pub missing: Vec<Survey>,
    /// Fetched bands, for renderers that draw contour lines
    #[serde(skip)]
    pub bands: BTreeMap<Survey, Band>,
}

impl QueryOutput {
    fn new(status: Status, info: impl Into<String>) -> Self {
        Self {
            status,
            info: info.into(),
            figures: Vec::new(),
            text: Vec::new(),
            missing: Vec::new(),
            bands: BTreeMap::new(),
        }
    }

    fn push_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.text.push((key.into(), value.into()));
    }

    pub fn panel_count(&self) -> usize {
        self.figures.iter().map(|f| f.panels.len()).sum()
    }
}

/// Bands of one query, placeholders included
#[derive(Debug, Clone, Default)]
pub struct FetchedBands {
    bands: BTreeMap<Survey, Band>,
    missing: Vec<Survey>,
}

impl FetchedBands {
    pub fn band(&self, survey: Survey) -> Result<ArrayView2<'_, f64>> {
        self.bands
            .get(&survey)
            .map(|b| b.view())
            .ok_or_else(|| RgbError::BandUnavailable {
                survey: survey.to_string(),
            })
    }

    pub fn is_missing(&self, survey: Survey) -> bool {
        self.missing.contains(&survey)
    }

    /// First missing band among `surveys`
    fn first_missing(&self, surveys: &[Survey]) -> Option<Survey> {
        surveys.iter().copied().find(|s| self.is_missing(*s))
    }

    pub fn missing(&self) -> &[Survey] {
        &self.missing
    }
}

/// Fetch every survey in `surveys`, substituting placeholders for the ones
/// the archive does not have
pub fn fetch_bands(
    fetcher: &dyn BandFetcher,
    surveys: &[Survey],
    field: &SkyField,
) -> Result<FetchedBands> {
    let mut fetched = FetchedBands::default();
    let expected = (field.px, field.px);

    for &survey in surveys {
        let band = match fetcher.fetch(survey, field) {
            Ok(band) if band.dim() == expected => band,
            Ok(band) => {
                return Err(RgbError::ShapeMismatch {
                    expected,
                    found: band.dim(),
                })
            }
            Err(e @ RgbError::ServerDown { .. }) => return Err(e),
            Err(e) => {
                if !matches!(e, RgbError::BandUnavailable { .. }) {
                    warn!(survey = %survey, error = %e, "Band fetch failed");
                }
                fetched.missing.push(survey);
                band::placeholder(field.px)
            }
        };

        log_band_stats(
            survey.short_name(),
            band.dim(),
            band::min(band.view()),
            band::max(band.view()),
            fetched.is_missing(survey),
        );
        fetched.bands.insert(survey, band);
    }

    Ok(fetched)
}

/// Runs queries against the external collaborators
pub struct Pipeline<'a> {
    pub fetcher: &'a dyn BandFetcher,
    pub catalogs: &'a dyn CatalogQuery,
    pub wcs: &'a dyn WorldToPixel,
    pub spidx: Option<&'a SpidxTable>,
    pub config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn run(&self, params: &QueryParams) -> Result<QueryOutput> {
        let start = Instant::now();
        let request_id = generate_request_id();
        log_operation_start("query", Some(params.field.to_hmsdms().as_str()));
        debug!(request_id = %request_id, images = ?params.images, px = params.field.px, "Query parameters");

        let surveys = plan_surveys(params.images);
        let fetched = match log_timed_operation("fetch_bands", || {
            fetch_bands(self.fetcher, &surveys, &params.field)
        }) {
            Ok(fetched) => fetched,
            Err(e @ RgbError::ServerDown { .. }) => {
                warn!(error = %e, "Image archive unreachable");
                log_operation_end("query", start, false);
                return Ok(QueryOutput::new(Status::Warning, "SkyView is down!"));
            }
            Err(e) => return Err(e),
        };

        let mut out = QueryOutput::new(Status::Success, "");
        out.push_text("Target center", params.field.to_hmsdms());
        for &survey in surveys.iter().filter(|s| s.is_radio()) {
            if !fetched.is_missing(survey) {
                out.push_text(survey.archive_name(), band::range_text(fetched.band(survey)?));
            }
        }

        let mut notes = Vec::new();
        match params.images {
            ImagesOption::RorIouOptical => self.ror_iou_optical(params, &fetched, &mut out, &mut notes)?,
            ImagesOption::ContoursOnDss2r => self.contours_on_dss2r(params, &fetched, &mut out, &mut notes)?,
        }

        let elapsed = start.elapsed().as_secs_f64();
        out.missing = fetched.missing().to_vec();
        if out.panel_count() == 0 {
            out.status = Status::Warning;
            notes.insert(0, "No images found.".to_string());
        } else if !notes.is_empty() {
            out.status = Status::Info;
        }
        notes.push(format!("completed in {}. ", (elapsed * 1000.0).round() / 1000.0));
        out.info = notes.join(" ");
        out.bands = fetched.bands;

        info!(
            operation = "query",
            request_id = %request_id,
            status = ?out.status,
            panels = out.panel_count(),
            missing = out.missing.len(),
            "Query finished"
        );
        log_operation_end("query", start, out.status == Status::Success);
        Ok(out)
    }

    /// Two ROR composites, then IOU and optical composites, all with contours
    fn ror_iou_optical(
        &self,
        params: &QueryParams,
        fetched: &FetchedBands,
        out: &mut QueryOutput,
        notes: &mut Vec<String>,
    ) -> Result<()> {
        let floors = &self.config.contours;
        let n = params.contour_levels;
        let (tgss, dss2r, nvss) = (
            fetched.band(Survey::Tgss)?,
            fetched.band(Survey::Dss2r)?,
            fetched.band(Survey::Nvss)?,
        );

        let (ror_nvss, nvss_levels) = overlayc(tgss, dss2r, nvss, nvss, n, floors.nvss)?;
        let (ror_tgss, tgss_levels) = overlayc(tgss, dss2r, nvss, tgss, n, floors.tgss)?;
        if let Some(l) = &nvss_levels {
            out.push_text("NVSS contour", format!("{:?}", round_levels(l, 4)));
        }
        if let Some(l) = &tgss_levels {
            out.push_text("TGSS contour", format!("{:?}", round_levels(l, 3)));
        }

        let mut ror_panels = Vec::new();
        if let Some(svy) = fetched.first_missing(&[Survey::Tgss, Survey::Dss2r, Survey::Nvss]) {
            notes.push(skip_note(Recipe::RorContour, svy));
        } else {
            ror_panels.push(
                Panel::new("ROR-RGB-C: TGSS(GMRT)-DSS2-NVSS(VLA)-NVSS", ror_nvss, params)
                    .with_contours(Survey::Nvss, "white", &nvss_levels),
            );
            ror_panels.push(
                Panel::new("ROR-RGB-C: TGSS(GMRT)-DSS2-NVSS(VLA)-TGSS", ror_tgss, params)
                    .with_contours(Survey::Tgss, "white", &tgss_levels),
            );
        }

        let mut direct_panels = Vec::new();
        for (recipe, title) in [
            (Recipe::Iou, "IOU-RGB-C: WISE(22)-DSS2(red)-GALEX(NUV)-TGSS"),
            (Recipe::Optical, "Optical-RGB-C: DSS2(IR)-DSS2(Red)-DSS2(blue)-TGSS"),
        ] {
            let [r, g, b] = recipe.bands();
            if let Some(svy) = fetched.first_missing(&[r, g, b]) {
                notes.push(skip_note(recipe, svy));
                continue;
            }
            let raster = overlayo(fetched.band(r)?, fetched.band(g)?, fetched.band(b)?, recipe)?;
            direct_panels.push(
                Panel::new(title, raster, params).with_contours(Survey::Tgss, "white", &tgss_levels),
            );
        }

        for (id, panels) in [("img1", ror_panels), ("img2", direct_panels)] {
            if !panels.is_empty() {
                out.figures.push(Figure {
                    id: id.to_string(),
                    panels,
                });
            }
        }
        Ok(())
    }

    /// DSS2 Red background with catalog ellipses, then with radio contours
    fn contours_on_dss2r(
        &self,
        params: &QueryParams,
        fetched: &FetchedBands,
        out: &mut QueryOutput,
        notes: &mut Vec<String>,
    ) -> Result<()> {
        let floors = &self.config.contours;
        let n = params.contour_levels;

        let tgss_levels = levels(fetched.band(Survey::Tgss)?, floors.tgss, n);
        let first_levels = levels(fetched.band(Survey::First)?, floors.first, n);
        let nvss_levels = levels(fetched.band(Survey::Nvss)?, floors.nvss, n);
        for (key, lvl, decimals) in [
            ("TGSS contour", &tgss_levels, 3),
            ("FIRST contour", &first_levels, 4),
            ("NVSS contour", &nvss_levels, 4),
        ] {
            if let Some(l) = lvl {
                out.push_text(key, format!("{:?}", round_levels(l, decimals)));
            }
        }

        if fetched.is_missing(Survey::Dss2r) {
            notes.push(format!(
                "DSS2 background skipped: {} unavailable.",
                Survey::Dss2r.archive_name()
            ));
            return Ok(());
        }
        let background = grey_background(fetched.band(Survey::Dss2r)?);

        let mut catalog_panel = Panel::new(" TGSS(GMRT)-NVSS(VLA)-DSS2R(DSS)", background.clone(), params);
        let mut catalog_failed = false;
        for catalog in CatalogSurvey::ALL {
            match overlay_catalog(catalog, self.catalogs, self.wcs, &params.field) {
                Ok(overlay) => {
                    out.text.extend(flux_text(&overlay));
                    catalog_panel.catalogs.push(overlay);
                }
                Err(e) => {
                    warn!(catalog = catalog.tag(), error = %e, "Catalog overlay dropped");
                    catalog_failed = true;
                }
            }
        }
        if catalog_failed {
            notes.push("catalog data missing".to_string());
        }

        if let Some(table) = self.spidx {
            catalog_panel.labels = self.spidx_labels(table, &params.field);
        }

        let contour_panel = Panel::new("TGSS(GMRT)-NVSS(VLA)-FIRST(VLA)-DSS2R(DSS)", background, params)
            .with_contours(Survey::Nvss, "cyan", &nvss_levels)
            .with_contours(Survey::Tgss, "magenta", &tgss_levels)
            .with_contours(Survey::First, "yellow", &first_levels);

        out.figures.push(Figure {
            id: "img1".to_string(),
            panels: vec![catalog_panel, contour_panel],
        });
        Ok(())
    }

    /// Spectral indices inside the field, placed through the WCS
    fn spidx_labels(&self, table: &SpidxTable, field: &SkyField) -> Vec<Label> {
        let matches = table.find_in_window(field.ra_deg, field.dec_deg, field.radius_deg);
        debug!(found = matches.len(), "Spectral indices in field");

        (0..matches.len())
            .filter_map(|i| {
                let (x, y) = self.wcs.world_to_pixel(matches.ra[i], matches.dec[i])?;
                Some(Label {
                    x,
                    y,
                    text: format!("{}", matches.index[i]),
                })
            })
            .collect()
    }
}

/// DSS2 Red stretched with sqrt between its 1st and 100th unique percentiles
pub fn grey_background(dss2r: ArrayView2<f64>) -> RgbRaster {
    let spec = ScaleSpec::sqrt(
        Some(band::percentile_of_unique(dss2r, 1.0)),
        Some(band::percentile_of_unique(dss2r, 100.0)),
    );
    RgbRaster::from_grey(spec.apply(dss2r).view())
}

fn skip_note(recipe: Recipe, survey: Survey) -> String {
    warn!(recipe = %recipe, survey = %survey, "Composite skipped, band unavailable");
    format!("{} skipped: {} unavailable.", recipe, survey.archive_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogRow, PositionAngle};
    use crate::spidx::SpidxPoint;
    use crate::wcs::LinearWcs;
    use ndarray::Array2;

    const PX: usize = 16;

    struct Gradient {
        missing: Vec<Survey>,
        down: bool,
    }

    impl BandFetcher for Gradient {
        fn fetch(&self, survey: Survey, field: &SkyField) -> Result<Band> {
            if self.down {
                return Err(RgbError::ServerDown {
                    message: "timeout".to_string(),
                });
            }
            if self.missing.contains(&survey) {
                return Err(RgbError::BandUnavailable {
                    survey: survey.to_string(),
                });
            }
            let peak = if survey.is_radio() { 0.5 } else { 1000.0 };
            Ok(Array2::from_shape_fn((field.px, field.px), |(i, j)| {
                peak * ((i * field.px + j) as f64 + 1.0) / (field.px * field.px) as f64
            }))
        }
    }

    struct OneSource;

    impl CatalogQuery for OneSource {
        fn query(&self, catalog: CatalogSurvey, field: &SkyField) -> Result<Vec<CatalogRow>> {
            match catalog {
                CatalogSurvey::Tgss => Err(RgbError::Catalog {
                    catalog: "TGSS".to_string(),
                    message: "timeout".to_string(),
                }),
                CatalogSurvey::Nvss => Ok(vec![CatalogRow {
                    ra_deg: field.ra_deg,
                    dec_deg: field.dec_deg,
                    major_arcsec: Some(45.0),
                    minor_arcsec: Some(45.0),
                    position_angle: PositionAngle::Degrees(0.0),
                    flux: Some(60.0),
                    flux_err: Some(2.6),
                    unit: "mJy".to_string(),
                }]),
            }
        }
    }

    fn params(images: ImagesOption) -> QueryParams {
        QueryParams::new("Ada Lovelace", SkyField::new(212.45, -3.04, 0.12, PX).unwrap(), images)
    }

    fn run(fetcher: &Gradient, images: ImagesOption, spidx: Option<&SpidxTable>) -> QueryOutput {
        let params = params(images);
        let wcs = LinearWcs::for_field(&params.field);
        let config = Config::default();
        Pipeline {
            fetcher,
            catalogs: &OneSource,
            wcs: &wcs,
            spidx,
            config: &config,
        }
        .run(&params)
        .unwrap()
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Al"), "Anonymous");
        assert_eq!(sanitize_name(""), "Anonymous");
        assert_eq!(sanitize_name("Ada"), "Ada");
        let long = "a".repeat(40);
        assert_eq!(sanitize_name(&long).len(), 28);
    }

    #[test]
    fn test_option_one_builds_four_panels() {
        let out = run(&Gradient { missing: vec![], down: false }, ImagesOption::RorIouOptical, None);

        assert_eq!(out.status, Status::Success);
        assert_eq!(out.figures.len(), 2);
        assert_eq!(out.panel_count(), 4);
        assert!(out.info.starts_with("completed in "));
        assert!(out.text.iter().any(|(k, _)| k == "TGSS contour"));
        assert!(out.text.iter().any(|(k, v)| k == "NVSS" && v.starts_with("value ranges from")));
        assert_eq!(out.figures[0].panels[0].raster.dim(), (PX, PX, 3));
    }

    #[test]
    fn test_missing_band_skips_its_composites_only() {
        let fetcher = Gradient {
            missing: vec![Survey::Gnuv],
            down: false,
        };
        let out = run(&fetcher, ImagesOption::RorIouOptical, None);

        assert_eq!(out.status, Status::Info);
        assert_eq!(out.missing, vec![Survey::Gnuv]);
        assert_eq!(out.panel_count(), 3);
        assert!(out.info.contains("IOU skipped"));
        assert!(out.bands[&Survey::Gnuv].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_server_down_is_a_warning() {
        let out = run(&Gradient { missing: vec![], down: true }, ImagesOption::ContoursOnDss2r, None);
        assert_eq!(out.status, Status::Warning);
        assert_eq!(out.info, "SkyView is down!");
        assert!(out.figures.is_empty());
    }

    #[test]
    fn test_option_two_survives_one_catalog_failing() {
        let table = SpidxTable::new(vec![SpidxPoint::from((212.45, -3.04, -0.7654))]);
        let out = run(
            &Gradient { missing: vec![], down: false },
            ImagesOption::ContoursOnDss2r,
            Some(&table),
        );

        assert_eq!(out.status, Status::Info);
        assert!(out.info.starts_with("catalog data missing"));

        let panels = &out.figures[0].panels;
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].catalogs.len(), 1);
        assert_eq!(panels[0].catalogs[0].catalog, CatalogSurvey::Nvss);
        assert_eq!(panels[0].catalogs[0].ellipses[0].angle_deg, 90.0);
        assert_eq!(panels[0].labels[0].text, "-0.765");
        assert_eq!(panels[1].contours.len(), 3);
        assert!(out.text.contains(&("S_NVSS-1".to_string(), "60.0 mJy".to_string())));
    }

    #[test]
    fn test_unannotated_panels_have_no_credit() {
        let mut params = params(ImagesOption::ContoursOnDss2r);
        params.annotate = false;
        let raster = grey_background(Array2::<f64>::zeros((2, 2)).view());
        assert!(Panel::new("t", raster, &params).credit.is_none());
    }
}
