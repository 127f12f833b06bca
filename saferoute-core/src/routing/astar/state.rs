use std::cmp::Ordering;

use crate::NodeId;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct State {
    /// `g + h`
    pub(super) priority: f64,
    pub(super) cost: f64,
    pub(super) node: NodeId,
}

impl Eq for State {}

// Implement Ord for State to use in BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by priority (reversed from standard Rust BinaryHeap)
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.cost.total_cmp(&self.cost))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
