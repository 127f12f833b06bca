//! Where graph documents come from

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::info;

use super::graph_file::{GraphDocument, build_road_graph};
use crate::interrupt::Interrupt;
use crate::model::{GraphKey, RoadGraph};
use crate::Error;

/// Produces a fully built graph for a key. May block on I/O.
pub trait GraphSource: Send + Sync {
    /// # Errors
    ///
    /// `GraphLoad` when the input is missing or structurally invalid,
    /// `Cancelled` when `interrupt` fires.
    fn load(&self, key: &GraphKey, interrupt: &dyn Interrupt) -> Result<RoadGraph, Error>;
}

/// Reads `<dir>/<region>_<network>.json`.
#[derive(Debug, Clone)]
pub struct FileGraphSource {
    dir: PathBuf,
}

impl FileGraphSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &GraphKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl GraphSource for FileGraphSource {
    fn load(&self, key: &GraphKey, interrupt: &dyn Interrupt) -> Result<RoadGraph, Error> {
        interrupt.check()?;

        let path = self.path_for(key);
        info!("Loading graph {key} from {}", path.display());

        let graph_load = |reason: String| Error::GraphLoad {
            key: key.to_string(),
            reason,
        };
        let file = File::open(&path)
            .map_err(|e| graph_load(format!("cannot open '{}': {e}", path.display())))?;
        let document: GraphDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| graph_load(format!("malformed '{}': {e}", path.display())))?;

        interrupt.check()?;
        Ok(build_road_graph(key.clone(), document))
    }
}

/// Serves graph documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraphSource {
    documents: HashMap<GraphKey, GraphDocument>,
}

impl MemoryGraphSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: GraphKey, document: GraphDocument) -> &mut Self {
        self.documents.insert(key, document);
        self
    }

    pub fn with(mut self, key: GraphKey, document: GraphDocument) -> Self {
        self.insert(key, document);
        self
    }
}

impl GraphSource for MemoryGraphSource {
    fn load(&self, key: &GraphKey, interrupt: &dyn Interrupt) -> Result<RoadGraph, Error> {
        interrupt.check()?;
        let document = self.documents.get(key).ok_or_else(|| Error::GraphLoad {
            key: key.to_string(),
            reason: "no graph document registered".to_string(),
        })?;
        Ok(build_road_graph(key.clone(), document.clone()))
    }
}
