//! # rgbmaker
//!
//! Radio/optical/infrared composite images from co-registered survey cutouts.
//!
//! This library holds the numeric core that turns single-band survey images
//! into 8-bit RGB composites with radio contour levels and catalog overlays.
//! Fetching images and catalog rows, and drawing the final figures, are done
//! by collaborators behind small traits.
//!
//! ## Key Features
//!
//! - **Intensity stretches**: linear, sqrt and log scaling between clipped,
//!   percentile-derived bounds
//! - **Composite recipes**: ROR contour composites and direct IOU/optical
//!   composites from a declarative per-channel table
//! - **Contour levels**: evenly spaced levels above a per-survey noise floor
//! - **Catalog overlays**: TGSS and NVSS sources as pixel-space ellipses
//! - **Spectral indices**: windowed lookup and two-point index
//!
//! ## Architecture
//!
//! - **Core**: [`band`], [`normalize`], [`scaling`], [`contour`], [`composite`]
//! - **Geometry**: [`wcs`], [`catalog`], [`spidx`]
//! - **Orchestration**: [`pipeline`] over the [`pipeline::BandFetcher`],
//!   [`catalog::CatalogQuery`] and [`wcs::WorldToPixel`] seams, with
//!   [`data_loader`] providing an offline implementation of all three

pub mod band;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod contour;
pub mod data_loader;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod scaling;
pub mod spidx;
pub mod survey;
pub mod wcs;

pub use composite::{overlayc, overlayo, Channel, Recipe, RgbRaster};
pub use config::Config;
pub use error::{Result, RgbError};
pub use logging::{
    generate_request_id, init_tracing, log_error, log_operation_end, log_operation_start,
    log_timed_operation,
};
pub use normalize::normalize;
pub use scaling::{linear, log, sqrt, Law, ScaleSpec};
pub use survey::{ImagesOption, Survey};
