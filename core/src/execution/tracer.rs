//! Execution tracing for augmenting-path searches
//!
//! A tracer passively records what the search does: which vertex each
//! epoch visits, which path it augments and when an epoch comes up empty.
//! Recording never changes the outcome of a run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::algorithm::traits::NodeId;
use crate::data_structures::flow_network::{Capacity, Epoch};

/// Single observable step of a max-flow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// Vertex marked as visited during `epoch`
    Visit { epoch: Epoch, vertex: NodeId },
    /// Path from source to drain augmented by `bottleneck`
    Augment {
        epoch: Epoch,
        bottleneck: Capacity,
        path: Vec<NodeId>,
    },
    /// Search of `epoch` found no augmenting path; the run ends here
    Exhausted { epoch: Epoch },
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct ExecutionTracer {
    events: Vec<TraceEvent>,
}

impl ExecutionTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Vertices visited during `epoch`, in visit order
    pub fn visits_in(&self, epoch: Epoch) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Visit { epoch: e, vertex } if *e == epoch => Some(*vertex),
                _ => None,
            })
            .collect()
    }

    /// First `(epoch, vertex)` pair visited more than once, if any
    pub fn find_revisit(&self) -> Option<(Epoch, NodeId)> {
        let mut seen = HashSet::new();
        self.events.iter().find_map(|event| match event {
            TraceEvent::Visit { epoch, vertex } if !seen.insert((*epoch, *vertex)) => {
                Some((*epoch, *vertex))
            }
            _ => None,
        })
    }

    /// Bottlenecks of all augmentations, in order
    pub fn bottlenecks(&self) -> Vec<Capacity> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Augment { bottleneck, .. } => Some(*bottleneck),
                _ => None,
            })
            .collect()
    }
}
