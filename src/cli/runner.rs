use tracing::info;

use toapro::api::process_manifest;
use toapro::core::params::ProcessingParams;
use toapro::io::manifest::{OutputLayout, SceneManifest};
use toapro::types::ProductKind;

use super::args::CliArgs;
use super::errors::AppError;

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let manifest = if let Some(manifest_file) = &args.manifest {
        info!("loading scene manifest: {:?}", manifest_file);
        SceneManifest::from_json_file(manifest_file).map_err(AppError::from)?
    } else if let Some(input_dir) = &args.input_dir {
        info!("discovering scenes under: {:?}", input_dir);
        SceneManifest::discover(input_dir).map_err(AppError::from)?
    } else {
        return Err(AppError::MissingArgument {
            arg: "--input-dir or --manifest".to_string(),
        }
        .into());
    };

    if manifest.is_empty() {
        info!("no scenes found; nothing to do");
        return Ok(());
    }

    for scene in &manifest.scenes {
        info!("scene {} [{}]", scene.id, scene.family.display_name());
    }

    let products = if args.products.is_empty() {
        ProductKind::all().to_vec()
    } else {
        args.products.clone()
    };
    let params = ProcessingParams {
        products,
        parallel: args.parallel,
        run_engine: args.run,
        modeler: args.modeler.clone(),
    };

    let layout = OutputLayout::new(&args.output_dir);
    let report = process_manifest(&manifest, &layout, &params).map_err(AppError::from)?;

    info!("Batch processing complete!");
    info!("Planned: {}", report.planned);
    info!("Skipped: {}", report.skipped);
    info!("Errors: {}", report.errors);

    Ok(())
}
