//! rgbmaker - radio/optical composite images from survey cutouts
//!
//! This is the main entry point for the rgbmaker command-line tool.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use rgbmaker::data_loader::{load_bundle, load_spidx_table};
use rgbmaker::pipeline::{Pipeline, QueryOutput, QueryParams};
use rgbmaker::spidx::two_point_index;
use rgbmaker::{init_tracing, log_error, Config};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let (mut config, args) = Config::load().context("Configuration error")?;

    init_tracing(&config.log_level);
    info!("Starting rgbmaker v{}", env!("CARGO_PKG_VERSION"));

    if let Some(flux) = &args.flux {
        if flux.len() != 2 || args.freq.len() != 2 {
            anyhow::bail!("--flux and --freq take exactly two comma-separated values");
        }
        let si = two_point_index(flux[0], flux[1], [args.freq[0], args.freq[1]]);
        println!("spectral index: {}", si);
    }

    let Some(bundle_path) = args.bundle else {
        if args.flux.is_none() {
            warn!("No bundle given, nothing to do");
        }
        return Ok(());
    };

    info!("Loading bundle: {:?}", bundle_path);
    let archive = load_bundle(&bundle_path).map_err(|e| {
        error!("Failed to load bundle: {}", e);
        e
    })?;

    if let Some(side) = archive.side_px() {
        if side != config.query.px {
            info!("Using the bundle's {} px grid instead of {} px", side, config.query.px);
            config.query.px = side;
        }
    }

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let spidx = match &config.query.spidx_file {
        Some(path) => Some(load_spidx_table(path)?),
        None => archive.spidx.clone(),
    };

    let params = QueryParams::from_config(&config, archive.ra_deg, archive.dec_deg)?;
    let wcs = archive.wcs_for(&params.field);
    let pipeline = Pipeline {
        fetcher: &archive,
        catalogs: &archive,
        wcs: &wcs,
        spidx: spidx.as_ref(),
        config: &config,
    };

    let output = pipeline.run(&params).map_err(|e| {
        log_error(&e, "query");
        e
    })?;
    let written = write_figures(&output, &config.output.dir)?;
    for path in &written {
        println!("saved {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Write every panel raster as PNG, one file per panel
fn write_figures(output: &QueryOutput, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if output.figures.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for figure in &output.figures {
        for panel in &figure.panels {
            let path = next_free_path(dir, "output", "png");
            std::fs::write(&path, panel.raster.encode_png()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(figure = %figure.id, title = %panel.title, "Wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

/// `dir/stem.ext`, or the first of `stem_1.ext`, `stem_2.ext`, ... that does not exist
fn next_free_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let first = dir.join(format!("{}.{}", stem, ext));
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| dir.join(format!("{}_{}.{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
