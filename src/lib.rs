#![doc = r#"
TOAPRO — a batch TOA reflectance and vegetation index processor.

This crate turns raw Landsat 4/5/7/8 and Sentinel-2 L1C scenes into
job descriptions for an external spatial-modeler engine: per-scene band
stacks, top-of-atmosphere (TOA) reflectance, and the NDVI, WDRI, and MSAVI
spectral indices. It resolves each sensor generation's calibration
coefficients and solar geometry from the scene's metadata document, builds
computation graphs around the TOA and index formulas, and serializes them
into the engine's job-description language together with a plain-text
calibration report. It powers the TOAPRO CLI and can be embedded in your own
Rust applications. Raster pixels are never touched here; the engine does
that work.

Stability
---------
The public library API is experimental in initial releases. Breaking changes
can occur.

Add dependency
--------------
```toml
[dependencies]
toapro = "0.1"
```

Quick start: plan and emit a batch
----------------------------------
```rust,no_run
use toapro::{OutputLayout, ProcessingParams, SceneManifest, process_manifest};

fn main() -> toapro::Result<()> {
    let manifest = SceneManifest::discover("/data/Raw_data")?;
    let layout = OutputLayout::new("/data");
    let params = ProcessingParams::default();

    let report = process_manifest(&manifest, &layout, &params)?;
    println!(
        "planned={} skipped={} errors={}",
        report.planned, report.skipped, report.errors
    );
    Ok(())
}
```

Plan a single scene
-------------------
```rust,no_run
use toapro::{OutputLayout, SceneEntry, plan_scene};
use toapro::types::ProductKind;

fn main() -> toapro::Result<()> {
    let scene = SceneEntry::new(
        "LC08_L1TP_021030_20130919_20170308_01_T1",
        "/data/Raw_data/LC08_L1TP_021030_20130919_20170308_01_T1",
    )?;
    let layout = OutputLayout::new("/data");
    let plan = plan_scene(&scene, &layout, ProductKind::all())?;

    for job in &plan.jobs {
        println!("{} -> {:?}", job.kind, job.graph_file);
    }
    Ok(())
}
```

Error handling
--------------
All public functions return `toapro::Result<T>`; match on `toapro::Error` to
handle specific cases. Metadata problems are scene-local: batch planning
logs and skips the scene instead of failing the run.

```rust,no_run
use toapro::{Error, OutputLayout, SceneEntry, plan_scene};
use toapro::types::ProductKind;

fn main() {
    let scene = SceneEntry::new("LE07_L1TP_021030_20110501_20200908_02_T1", "/bad/path")
        .expect("known prefix");
    let layout = OutputLayout::new("/out");
    match plan_scene(&scene, &layout, ProductKind::all()) {
        Ok(plan) => println!("{} job(s)", plan.jobs.len()),
        Err(Error::Metadata(e)) => eprintln!("metadata error: {e}"),
        Err(other) => eprintln!("other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`types`] — enums and core types (e.g. `SensorFamily`, `ProductKind`).
- [`core`] — calibration resolution and computation-graph construction.
- [`io`] — metadata/manifest readers and job/report writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::ProcessingParams;
pub use crate::error::{Error, Result};
pub use crate::types::{CalibrationEpoch, GainState, ProductKind, SensorFamily};

// Calibration
pub use crate::core::processing::calibration::{
    CalibrationCoefficients, SceneCalibration, SolarGeometry,
};
pub use crate::core::processing::solar::{AcquisitionDate, day_of_year, earth_sun_distance};

// Readers
pub use crate::io::manifest::{OutputLayout, SceneEntry, SceneManifest};
pub use crate::io::metadata::{MetadataDoc, MetadataError};

// Writers
pub use crate::io::writers::job::{Invocation, Job, ModelerEngine};
pub use crate::io::writers::report::ReportEntry;

// High-level API re-exports
pub use crate::api::{
    BatchReport, ScenePlan, emit, plan_batch, plan_scene, process_manifest, report_entries,
};
