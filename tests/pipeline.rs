//! End-to-end planning over synthetic scene trees: discovery, calibration
//! resolution, job emission, idempotence, and the calibration report.

use std::fs::{self, File};
use std::path::Path;

use toapro::types::ProductKind;
use toapro::{
    ModelerEngine, OutputLayout, ProcessingParams, SceneManifest, emit, plan_batch, plan_scene,
    report_entries,
};

const L8_ID: &str = "LC08_L1TP_021030_20130919_20170308_01_T1";
const S2_ID: &str = "L1C_T16TDL_A020821_20190604T164859";

/// MTL values are written at the exact field widths the trailing-offset
/// reader expects, matching the reference document format.
fn write_l8_scene(root: &Path) {
    let dir = root.join(L8_ID);
    fs::create_dir_all(&dir).unwrap();
    let mut mtl = String::new();
    for band in 2..=7 {
        mtl.push_str(&format!("    RADIANCE_MULT_BAND_{band} = 1.0000E-02\n"));
        mtl.push_str(&format!("    RADIANCE_ADD_BAND_{band} = -50.00000\n"));
    }
    mtl.push_str("    SUN_ELEVATION = 45.00000000\n");
    mtl.push_str("    EARTH_SUN_DISTANCE = 1.0000000\n");
    fs::write(dir.join(format!("{L8_ID}_MTL.txt")), mtl).unwrap();
    for band in 1..=7 {
        File::create(dir.join(format!("{L8_ID}_b{band}.tif"))).unwrap();
    }
}

fn write_s2_scene(root: &Path) {
    let dir = root.join(S2_ID);
    fs::create_dir_all(&dir).unwrap();
    for band in [2, 3, 4, 8] {
        File::create(dir.join(format!("{S2_ID}_B{band:02}.jp2"))).unwrap();
    }
}

#[test]
fn l8_scene_plans_the_full_product_chain() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("Raw_data");
    fs::create_dir(&raw).unwrap();
    write_l8_scene(&raw);

    let manifest = SceneManifest::discover(&raw).unwrap();
    assert_eq!(manifest.len(), 1);

    let layout = OutputLayout::new(tmp.path());
    layout.prepare().unwrap();

    let plan = plan_scene(&manifest.scenes[0], &layout, ProductKind::all()).unwrap();
    assert_eq!(plan.jobs.len(), 5);

    // The stack declares all seven raw band inputs.
    let stack = &plan.jobs[0];
    assert_eq!(stack.kind, ProductKind::Stack);
    assert_eq!(stack.graph.input_count(), 7);

    // The TOA job carries the resolved metadata values and the L8 ESUN set.
    let toa = &plan.jobs[1];
    assert_eq!(toa.kind, ProductKind::Toa);
    let text = toa.graph.serialize();
    assert!(text.contains("ESUN_values = TABLE(2067, 1893, 1603, 972.6, 245, 79.72);"));
    assert!(text.contains("rad_mult = TABLE(0.01, 0.01, 0.01, 0.01, 0.01, 0.01);"));
    assert!(text.contains("rad_add = TABLE(-50, -50, -50, -50, -50, -50);"));
    assert!(text.contains("distance = 1;"));
    assert!(text.contains("sun_elev = 45;"));
    // One terminal write stacking the six reflectance bands.
    assert_eq!(
        text.matches("STACKLAYERS").count(),
        1,
        "exactly one terminal stack write"
    );
    assert!(text.contains(
        "n32 = STACKLAYERS ( n25_memory , n26_memory , n27_memory , n28_memory , n29_memory , n30_memory ) ;"
    ));

    let coefficients = plan.calibration.coefficients().unwrap();
    assert_eq!(coefficients.gains, [0.01; 6]);
    assert_eq!(coefficients.biases, [-50.0; 6]);
    let geometry = plan.calibration.geometry().unwrap();
    assert_eq!(geometry.sun_elevation, 45.0);
    assert_eq!(geometry.earth_sun_distance, 1.0);
}

#[test]
fn s2_scene_skips_toa_and_indexes_the_raw_stack() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("Raw_data");
    fs::create_dir(&raw).unwrap();
    write_s2_scene(&raw);

    let manifest = SceneManifest::discover(&raw).unwrap();
    let layout = OutputLayout::new(tmp.path());
    layout.prepare().unwrap();

    let plan = plan_scene(&manifest.scenes[0], &layout, ProductKind::all()).unwrap();
    let kinds: Vec<ProductKind> = plan.jobs.iter().map(|j| j.kind).collect();
    assert_eq!(
        kinds,
        [ProductKind::Stack, ProductKind::Ndvi, ProductKind::Wdri, ProductKind::Msavi]
    );

    // Indices read the reflectance-scaled stack directly.
    let ndvi = &plan.jobs[1];
    let text = ndvi.graph.serialize();
    assert!(text.contains(&format!("Stacks/{S2_ID}_stack.img")));
    assert!(!text.contains("Toa_ref"));
}

#[test]
fn emitted_jobs_land_next_to_the_scene_with_a_batch_list() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("Raw_data");
    fs::create_dir(&raw).unwrap();
    write_l8_scene(&raw);

    let manifest = SceneManifest::discover(&raw).unwrap();
    let layout = OutputLayout::new(tmp.path());
    layout.prepare().unwrap();
    let params = ProcessingParams::default();

    let (plans, report) = plan_batch(&manifest, &layout, &params);
    assert_eq!(report.planned, 1);
    assert_eq!(report.errors, 0);

    let engine = ModelerEngine::new("modeler");
    let jobs = emit(&plans, &layout, &engine).unwrap();
    assert_eq!(jobs.len(), 5);

    let scene_dir = raw.join(L8_ID);
    for suffix in [
        "_parameter_stackA",
        "_parameter_stackB",
        "_atmcorrParamA",
        "_atmcorrParamB",
        "_ndvi_paramA",
        "_ndvi_paramB",
        "_wdri_paramA",
        "_wdri_paramB",
        "_msavi_paramA",
        "_msavi_paramB",
    ] {
        assert!(
            scene_dir.join(format!("{L8_ID}{suffix}")).exists(),
            "missing {suffix}"
        );
    }

    let batch = fs::read_to_string(layout.batch_file()).unwrap();
    assert_eq!(batch.lines().count(), 5);
    assert!(batch.lines().all(|l| l.starts_with("\"modeler\" @")));

    // Descriptors reference their job files.
    let stack_b = fs::read_to_string(scene_dir.join(format!("{L8_ID}_parameter_stackB"))).unwrap();
    assert!(stack_b.starts_with("5\nmodeler\n-nq\n"));
    assert!(stack_b.contains("_parameter_stackA"));
    let toa_b = fs::read_to_string(scene_dir.join(format!("{L8_ID}_atmcorrParamB"))).unwrap();
    assert!(toa_b.ends_with("-meter\n-state\n-delete_model\n"));
}

#[test]
fn rerunning_a_processed_batch_is_an_idempotent_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("Raw_data");
    fs::create_dir(&raw).unwrap();
    write_l8_scene(&raw);

    let manifest = SceneManifest::discover(&raw).unwrap();
    let layout = OutputLayout::new(tmp.path());
    layout.prepare().unwrap();
    let params = ProcessingParams::default();

    let (first_plans, _) = plan_batch(&manifest, &layout, &params);
    let first_report = toapro::io::writers::report::render(&report_entries(&first_plans));

    // Pretend the engine produced every target product.
    for kind in ProductKind::all() {
        File::create(layout.product_file(*kind, L8_ID)).unwrap();
    }

    let (plans, report) = plan_batch(&manifest, &layout, &params);
    assert_eq!(report.planned, 0);
    assert_eq!(report.skipped, 1);
    assert!(plans.iter().all(|p| p.jobs.is_empty()));

    let engine = ModelerEngine::new("modeler");
    let jobs = emit(&plans, &layout, &engine).unwrap();
    assert!(jobs.is_empty());
    assert_eq!(fs::read_to_string(layout.batch_file()).unwrap(), "");

    // The report is a pure projection of the resolved scenes: unchanged.
    let second_report = toapro::io::writers::report::render(&report_entries(&plans));
    assert_eq!(first_report, second_report);
}

#[test]
fn a_scene_with_broken_metadata_is_excluded_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let raw = tmp.path().join("Raw_data");
    fs::create_dir(&raw).unwrap();
    write_l8_scene(&raw);

    // Second L8 scene with an empty metadata document.
    let bad_id = "LC08_L1TP_022031_20140101_20170308_01_T1";
    let bad_dir = raw.join(bad_id);
    fs::create_dir_all(&bad_dir).unwrap();
    fs::write(bad_dir.join(format!("{bad_id}_MTL.txt")), "").unwrap();
    for band in 1..=7 {
        File::create(bad_dir.join(format!("{bad_id}_b{band}.tif"))).unwrap();
    }

    let manifest = SceneManifest::discover(&raw).unwrap();
    assert_eq!(manifest.len(), 2);

    let layout = OutputLayout::new(tmp.path());
    layout.prepare().unwrap();
    let params = ProcessingParams::default();

    let (plans, report) = plan_batch(&manifest, &layout, &params);
    assert_eq!(report.planned, 1);
    assert_eq!(report.errors, 1);
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].scene.id, L8_ID);
}
