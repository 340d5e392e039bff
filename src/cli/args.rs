use clap::Parser;
use std::path::PathBuf;

use toapro::types::ProductKind;

#[derive(Parser)]
#[command(name = "toapro", version, about = "TOAPRO CLI")]
pub struct CliArgs {
    /// Input directory containing scene subdirectories (discovery mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// JSON scene manifest written by an external discovery tool
    /// (alternative to --input-dir)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Output directory for product folders, the batch list, and the report
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Products to plan, comma separated (defaults to all:
    /// stack,toa,ndvi,wdri,msavi)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub products: Vec<ProductKind>,

    /// Spatial-modeler executable written into the batch list
    #[arg(long, default_value = "modeler")]
    pub modeler: PathBuf,

    /// Hand the batch list to the engine after emitting jobs
    #[arg(long, default_value_t = false)]
    pub run: bool,

    /// Plan scenes on the rayon thread pool (output order is unchanged)
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
