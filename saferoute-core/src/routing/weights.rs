//! Request-local edge risks

use log::trace;
use rayon::prelude::*;

use crate::model::{EdgeKey, WorkingGraph};
use crate::risk::{EdgeWeightCache, EdgeWeightKey, IncidentIndex};

/// Risk of every edge in a working graph, indexed by part and edge index.
/// Lives for one request; the shared graphs are never written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeRisks {
    parts: Vec<Vec<f64>>,
}

impl EdgeRisks {
    pub fn from_parts(parts: Vec<Vec<f64>>) -> Self {
        Self { parts }
    }

    /// Scores all edges against one incident snapshot, going through the
    /// shared cache so fresh entries are reused.
    pub fn compute(
        graph: &WorkingGraph,
        index: &IncidentIndex,
        cache: &EdgeWeightCache,
        now_ms: i64,
    ) -> Self {
        let parts = graph
            .parts()
            .iter()
            .map(|part| {
                let edges: Vec<_> = part.edges().collect();
                let scored: Vec<(usize, f64)> = edges
                    .par_iter()
                    .map(|&(edge, from, to, data)| {
                        let key = EdgeWeightKey {
                            graph: part.key().clone(),
                            from,
                            to,
                            edge: edge.index(),
                        };
                        let risk = cache.get_or_compute(key, now_ms, || index.edge_risk(data));
                        if risk > 0.0 {
                            trace!("Graph {}: edge {from} -> {to} risk {risk}", part.key());
                        }
                        (edge.index(), risk)
                    })
                    .collect();

                let mut risks = vec![0.0; part.edge_count()];
                for (edge, risk) in scored {
                    if let Some(slot) = risks.get_mut(edge) {
                        *slot = risk;
                    }
                }
                risks
            })
            .collect();

        Self { parts }
    }

    /// Zero for edges this table does not know.
    pub fn risk(&self, key: EdgeKey) -> f64 {
        self.parts
            .get(key.part)
            .and_then(|part| part.get(key.edge.index()))
            .copied()
            .unwrap_or(0.0)
    }
}
