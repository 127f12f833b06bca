//! Process-wide cache of loaded graphs

use std::sync::{Arc, RwLock};

use hashbrown::HashMap;
use log::{debug, info};

use super::sources::GraphSource;
use crate::interrupt::Interrupt;
use crate::model::{GraphKey, RoadGraph};
use crate::Error;

/// Graphs keyed by region and network type, kept for the process lifetime.
///
/// Readers see either no entry or a fully built graph. Two requests racing
/// on the same key may both parse; the first to publish wins and the other
/// copy is dropped. A failed load leaves the slot empty.
pub struct GraphCatalog {
    source: Box<dyn GraphSource>,
    graphs: RwLock<HashMap<GraphKey, Arc<RoadGraph>>>,
}

impl std::fmt::Debug for GraphCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GraphCatalog with {:?} graphs", self.len())
    }
}

const POISONED: &str = "graph catalog lock poisoned";

impl GraphCatalog {
    pub fn new(source: impl GraphSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            graphs: RwLock::new(HashMap::new()),
        }
    }

    /// Already published graph, if any.
    pub fn get(&self, key: &GraphKey) -> Result<Option<Arc<RoadGraph>>, Error> {
        let graphs = self
            .graphs
            .read()
            .map_err(|_| Error::UnrecoverableError(POISONED))?;
        Ok(graphs.get(key).cloned())
    }

    pub fn get_or_load(
        &self,
        key: &GraphKey,
        interrupt: &dyn Interrupt,
    ) -> Result<Arc<RoadGraph>, Error> {
        if let Some(graph) = self.get(key)? {
            return Ok(graph);
        }

        // Parse without holding the lock so other keys stay available.
        let loaded = Arc::new(self.source.load(key, interrupt)?);
        interrupt.check()?;

        let mut graphs = self
            .graphs
            .write()
            .map_err(|_| Error::UnrecoverableError(POISONED))?;
        match graphs.get(key) {
            Some(published) => {
                debug!("Graph {key} was published concurrently, discarding local copy");
                Ok(Arc::clone(published))
            }
            None => {
                info!("Published graph {key}");
                graphs.insert(key.clone(), Arc::clone(&loaded));
                Ok(loaded)
            }
        }
    }

    pub fn keys(&self) -> Vec<GraphKey> {
        self.graphs
            .read()
            .map(|graphs| graphs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.graphs.read().map(|graphs| graphs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
