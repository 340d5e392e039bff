//! High-level, ergonomic library API: plan scenes into engine jobs, emit job
//! files and the batch list, and write the calibration report. Prefer these
//! entrypoints over the low-level processing modules when integrating TOAPRO.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::core::params::ProcessingParams;
use crate::core::processing::calibration::{self, SceneCalibration};
use crate::core::processing::formulas;
use crate::error::Result;
use crate::io::manifest::{OutputLayout, SceneEntry, SceneManifest};
use crate::io::metadata::MetadataDoc;
use crate::io::writers::job::{Job, ModelerEngine};
use crate::io::writers::report::{self, ReportEntry};
use crate::types::ProductKind;

/// Everything planned for one scene: the resolved calibration and the jobs
/// whose target products do not exist yet.
#[derive(Debug, Clone)]
pub struct ScenePlan {
    pub scene: SceneEntry,
    pub calibration: SceneCalibration,
    pub jobs: Vec<Job>,
}

/// Batch outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Scenes contributing at least one job.
    pub planned: usize,
    /// Scenes resolved but fully processed already (idempotent no-op).
    pub skipped: usize,
    /// Scenes excluded by a scene-local error.
    pub errors: usize,
}

/// Resolve one scene and build jobs for every requested product whose
/// target artifact is missing. Scene-local failures (unreadable metadata,
/// missing fields, a garbled identifier) surface as errors; the scene then
/// contributes nothing downstream.
pub fn plan_scene(
    scene: &SceneEntry,
    layout: &OutputLayout,
    products: &[ProductKind],
) -> Result<ScenePlan> {
    let doc = match scene.metadata_file() {
        Some(path) => Some(MetadataDoc::read(path)?),
        None => None,
    };
    let calibration = calibration::resolve(scene.family, &scene.id, doc.as_ref())?;

    let mut jobs = Vec::new();
    for kind in products {
        if let Some(job) = plan_product(scene, layout, &calibration, *kind) {
            jobs.push(job);
        }
    }
    debug!("planned {} job(s) for {}", jobs.len(), scene.id);
    Ok(ScenePlan {
        scene: scene.clone(),
        calibration,
        jobs,
    })
}

fn plan_product(
    scene: &SceneEntry,
    layout: &OutputLayout,
    calibration: &SceneCalibration,
    kind: ProductKind,
) -> Option<Job> {
    // Sentinel-2 bands are reflectance-scaled already; there is no TOA step.
    if kind == ProductKind::Toa && !scene.family.has_radiometric_rescale() {
        return None;
    }
    let target = layout.product_file(kind, &scene.id);
    if target.exists() {
        debug!("{} {} already processed, skipping", scene.id, kind);
        return None;
    }

    let stack_img = layout.product_file(ProductKind::Stack, &scene.id);
    // Indices read the calibrated stack: the TOA raster for Landsat, the
    // raw reflectance-scaled stack for Sentinel-2.
    let index_source = if scene.family.has_radiometric_rescale() {
        layout.product_file(ProductKind::Toa, &scene.id)
    } else {
        stack_img.clone()
    };

    let graph = match kind {
        ProductKind::Stack => formulas::stack_graph(scene.family, &scene.band_files(), &target),
        ProductKind::Toa => {
            let SceneCalibration::Rescaled {
                coefficients,
                geometry,
            } = calibration
            else {
                return None;
            };
            formulas::toa_graph(scene.family, &stack_img, &target, coefficients, *geometry)
        }
        ProductKind::Ndvi => formulas::ndvi_graph(&index_source, &target),
        ProductKind::Wdri => formulas::wdri_graph(&index_source, &target),
        ProductKind::Msavi => formulas::msavi_graph(&index_source, &target),
    };

    Some(Job {
        scene_id: scene.id.clone(),
        kind,
        graph,
        graph_file: scene.job_file(kind),
        descriptor_file: scene.descriptor_file(kind),
    })
}

/// Plan every scene of the manifest. Scene-local errors are logged and
/// counted, never fatal. With `params.parallel` the planning runs on the
/// rayon thread pool; collection is positional, so the resulting plan order
/// (and everything emitted from it) is identical to the sequential run.
pub fn plan_batch(
    manifest: &SceneManifest,
    layout: &OutputLayout,
    params: &ProcessingParams,
) -> (Vec<ScenePlan>, BatchReport) {
    let results: Vec<Result<ScenePlan>> = if params.parallel {
        manifest
            .scenes
            .par_iter()
            .map(|scene| plan_scene(scene, layout, &params.products))
            .collect()
    } else {
        manifest
            .scenes
            .iter()
            .map(|scene| plan_scene(scene, layout, &params.products))
            .collect()
    };

    let mut plans = Vec::new();
    let mut report = BatchReport::default();
    for (scene, result) in manifest.scenes.iter().zip(results) {
        match result {
            Ok(plan) => {
                if plan.jobs.is_empty() {
                    report.skipped += 1;
                } else {
                    report.planned += 1;
                }
                plans.push(plan);
            }
            Err(e) => {
                warn!("skipping scene {}: {}", scene.id, e);
                report.errors += 1;
            }
        }
    }
    (plans, report)
}

/// Write every planned job's files plus the batch list, in plan order.
/// Returns the flattened job list handed to the engine.
pub fn emit(plans: &[ScenePlan], layout: &OutputLayout, engine: &ModelerEngine) -> Result<Vec<Job>> {
    let jobs: Vec<Job> = plans.iter().flat_map(|p| p.jobs.iter().cloned()).collect();
    for job in &jobs {
        job.write()?;
    }
    engine.write_batch_file(&layout.batch_file(), &jobs)?;
    Ok(jobs)
}

/// Project the resolved plans into report entries, in plan order.
pub fn report_entries(plans: &[ScenePlan]) -> Vec<ReportEntry> {
    plans
        .iter()
        .map(|plan| ReportEntry {
            scene_id: plan.scene.id.clone(),
            family: plan.scene.family,
            calibration: plan.calibration.clone(),
        })
        .collect()
}

/// Full pipeline over a manifest: prepare the layout, plan, emit, report,
/// and optionally hand the batch to the engine. A batch with zero
/// resolvable scenes produces nothing and is not an error.
pub fn process_manifest(
    manifest: &SceneManifest,
    layout: &OutputLayout,
    params: &ProcessingParams,
) -> Result<BatchReport> {
    layout.prepare()?;
    let (plans, batch_report) = plan_batch(manifest, layout, params);

    if plans.is_empty() {
        info!("no resolvable scenes; skipping job emission and report");
        return Ok(batch_report);
    }

    let engine = ModelerEngine::new(&params.modeler);
    let jobs = emit(&plans, layout, &engine)?;
    report::write(&layout.report_file(), &report_entries(&plans))?;

    if params.run_engine {
        if jobs.is_empty() {
            info!("all target products exist; engine invocation skipped");
        } else {
            engine.run_batch(&layout.batch_file())?;
        }
    }

    info!(
        "batch complete: planned={} skipped={} errors={}",
        batch_report.planned, batch_report.skipped, batch_report.errors
    );
    Ok(batch_report)
}
