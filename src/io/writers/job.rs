//! Job emission: first-stage job files, second-stage invocation descriptors,
//! the batch list, and the opaque hand-off to the external engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::core::processing::graph::ComputationGraph;
use crate::error::{Error, Result};
use crate::types::ProductKind;

/// Second-stage invocation descriptor: fixed directive lines naming the
/// execution mode, the job file, and the runtime flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub job_file: PathBuf,
    /// `-nq` flag (stack and the normalized indices).
    pub quiet: bool,
    /// `-delete_model` flag (TOA and MSAVI).
    pub delete_model: bool,
}

impl Invocation {
    pub fn for_product(kind: ProductKind, job_file: PathBuf) -> Self {
        let (quiet, delete_model) = match kind {
            ProductKind::Stack | ProductKind::Ndvi | ProductKind::Wdri => (true, false),
            ProductKind::Toa | ProductKind::Msavi => (false, true),
        };
        Invocation {
            job_file,
            quiet,
            delete_model,
        }
    }

    pub fn serialize(&self) -> String {
        let mut out = String::from("5\nmodeler\n");
        if self.quiet {
            out.push_str("-nq\n");
        }
        out.push_str(&format!("{}\n", self.job_file.display()));
        out.push_str("-meter\n-state\n");
        if self.delete_model {
            out.push_str("-delete_model\n");
        }
        out
    }
}

/// One planned unit of engine work: a computation graph plus the two files
/// it is serialized into.
#[derive(Debug, Clone)]
pub struct Job {
    pub scene_id: String,
    pub kind: ProductKind,
    pub graph: ComputationGraph,
    pub graph_file: PathBuf,
    pub descriptor_file: PathBuf,
}

impl Job {
    pub fn invocation(&self) -> Invocation {
        Invocation::for_product(self.kind, self.graph_file.clone())
    }

    /// Write both stages to disk.
    pub fn write(&self) -> Result<()> {
        fs::write(&self.graph_file, self.graph.serialize())?;
        fs::write(&self.descriptor_file, self.invocation().serialize())?;
        Ok(())
    }
}

/// The external spatial-modeler engine: batch list construction and one
/// blocking, opaque invocation.
#[derive(Debug, Clone)]
pub struct ModelerEngine {
    pub modeler: PathBuf,
}

impl ModelerEngine {
    pub fn new<P: AsRef<Path>>(modeler: P) -> Self {
        ModelerEngine {
            modeler: modeler.as_ref().to_path_buf(),
        }
    }

    /// One batch line: the quoted engine path, then `@` and the descriptor.
    pub fn batch_line(&self, job: &Job) -> String {
        format!(
            "\"{}\" @{}",
            self.modeler.display(),
            job.descriptor_file.display()
        )
    }

    /// Write the batch list. An empty job list writes an empty file so a
    /// re-run leaves no stale work behind.
    pub fn write_batch_file(&self, path: &Path, jobs: &[Job]) -> Result<()> {
        let mut text = String::new();
        for job in jobs {
            text.push_str(&self.batch_line(job));
            text.push('\n');
        }
        fs::write(path, text)?;
        info!("wrote batch list with {} job(s): {:?}", jobs.len(), path);
        Ok(())
    }

    /// Hand the batch to the engine and block until it finishes. Success or
    /// failure is all the caller learns; there is no streaming progress and
    /// no cancellation.
    pub fn run_batch(&self, batch_file: &Path) -> Result<()> {
        info!("running engine batch: {:?}", batch_file);
        let status = Command::new(batch_file)
            .status()
            .map_err(Error::engine)?;
        if !status.success() {
            return Err(Error::Engine(format!(
                "engine batch exited with status {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_descriptor_is_quiet_without_model_cleanup() {
        let inv = Invocation::for_product(ProductKind::Stack, PathBuf::from("/raw/s/s_parameter_stackA"));
        assert_eq!(
            inv.serialize(),
            "5\nmodeler\n-nq\n/raw/s/s_parameter_stackA\n-meter\n-state\n"
        );
    }

    #[test]
    fn toa_descriptor_deletes_the_model_and_is_not_quiet() {
        let inv = Invocation::for_product(ProductKind::Toa, PathBuf::from("/raw/s/s_atmcorrParamA"));
        assert_eq!(
            inv.serialize(),
            "5\nmodeler\n/raw/s/s_atmcorrParamA\n-meter\n-state\n-delete_model\n"
        );
    }

    #[test]
    fn index_descriptors_match_their_products() {
        let ndvi = Invocation::for_product(ProductKind::Ndvi, PathBuf::from("/a"));
        assert!(ndvi.quiet && !ndvi.delete_model);
        let msavi = Invocation::for_product(ProductKind::Msavi, PathBuf::from("/a"));
        assert!(!msavi.quiet && msavi.delete_model);
    }

    #[test]
    fn batch_line_quotes_the_engine_path() {
        let engine = ModelerEngine::new("/opt/engine/modeler");
        let job = Job {
            scene_id: "scene".into(),
            kind: ProductKind::Stack,
            graph: ComputationGraph::new(),
            graph_file: PathBuf::from("/raw/scene/scene_parameter_stackA"),
            descriptor_file: PathBuf::from("/raw/scene/scene_parameter_stackB"),
        };
        assert_eq!(
            engine.batch_line(&job),
            "\"/opt/engine/modeler\" @/raw/scene/scene_parameter_stackB"
        );
    }

    #[test]
    fn empty_batch_writes_an_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let batch = tmp.path().join("atm_batch_process.bat");
        let engine = ModelerEngine::new("modeler");
        engine.write_batch_file(&batch, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&batch).unwrap(), "");
    }
}
