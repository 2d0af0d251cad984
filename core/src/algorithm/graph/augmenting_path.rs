//! Depth-first augmenting-path search
//!
//! One call to [`AugmentingPathSearch::search`] finds a single simple path
//! of positive residual capacity from the start vertex to the drain and
//! pushes its bottleneck along it. Vertices are marked with the current
//! epoch on entry and never entered twice within the same epoch, so every
//! call terminates and explores at most one frame per vertex.
//!
//! Two equivalent drivers exist. The recursive one keeps its frames on the
//! call stack and applies residual updates while unwinding. The explicit
//! stack one keeps `(vertex, cursor, bottleneck, entering edge)` frames on
//! the heap, so its depth is not limited by the thread's stack. For the
//! same network both visit the same vertices in the same order and apply
//! the same augmentations.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::NodeId;
use crate::data_structures::flow_network::{Capacity, Epoch, FlowNetwork, NeighborLookup};
use crate::execution::tracer::{ExecutionTracer, TraceEvent};

/// Initial bottleneck handed to a search; never the minimum along a path
/// whose capacities are finite.
pub const UNBOUNDED: Capacity = Capacity::MAX;

/// How the depth-first search keeps its frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Native recursion; depth bounded by the vertex count
    #[default]
    Recursive,
    /// Heap-allocated frame stack
    ExplicitStack,
}

impl SearchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStrategy::Recursive => "recursive",
            SearchStrategy::ExplicitStack => "explicit_stack",
        }
    }
}

/// Counters accumulated across every search run by one instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    pub searches: usize,
    pub vertices_visited: usize,
    pub edges_examined: usize,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: NodeId,
    cursor: usize,
    bottleneck: Capacity,
    entered_by: Option<usize>,
}

/// Augmenting-path search towards a fixed drain
#[derive(Debug)]
pub struct AugmentingPathSearch<'t> {
    drain: NodeId,
    strategy: SearchStrategy,
    lookup: NeighborLookup,
    /// Vertices of the last augmenting path, source first
    path: Vec<NodeId>,
    statistics: SearchStatistics,
    tracer: Option<&'t mut ExecutionTracer>,
}

impl<'t> AugmentingPathSearch<'t> {
    pub fn new(drain: NodeId, strategy: SearchStrategy, lookup: NeighborLookup) -> Self {
        Self {
            drain,
            strategy,
            lookup,
            path: Vec::new(),
            statistics: SearchStatistics::default(),
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: &'t mut ExecutionTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    /// Path applied by the last successful search; empty after a failed one
    pub fn last_path(&self) -> &[NodeId] {
        &self.path
    }

    /// Find one augmenting path from `start` carrying at most `bottleneck`
    /// and apply it to `network`. Returns the amount pushed, or 0 when no
    /// path with positive residual capacity reaches the drain.
    ///
    /// A `bottleneck` of zero or less can carry nothing: the call returns 0
    /// without marking any vertex or touching the network.
    pub fn search(
        &mut self,
        network: &mut FlowNetwork,
        start: NodeId,
        bottleneck: Capacity,
        epoch: Epoch,
    ) -> Capacity {
        self.path.clear();
        self.statistics.searches += 1;
        if bottleneck <= 0 {
            return 0;
        }

        let pushed = match self.strategy {
            SearchStrategy::Recursive => {
                let pushed = self.search_recursive(network, start, bottleneck, epoch);
                self.path.reverse();
                pushed
            }
            SearchStrategy::ExplicitStack => self.search_iterative(network, start, bottleneck, epoch),
        };

        if pushed == 0 {
            self.path.clear();
        }
        pushed
    }

    pub(crate) fn record(&mut self, event: TraceEvent) {
        if let Some(tracer) = self.tracer.as_deref_mut() {
            tracer.record(event);
        }
    }

    pub(crate) fn tracing(&self) -> bool {
        self.tracer.is_some()
    }

    // Path is collected drain-first while unwinding.
    fn search_recursive(
        &mut self,
        network: &mut FlowNetwork,
        current: NodeId,
        bottleneck: Capacity,
        epoch: Epoch,
    ) -> Capacity {
        if current == self.drain {
            self.path.push(current);
            return bottleneck;
        }

        self.visit(network, current, epoch);

        let mut cursor = 0;
        while let Some((next, index)) = network.next_incident(current, self.lookup, cursor) {
            cursor = next;
            let Some((far, residual)) = self.admissible(network, current, index, epoch) else {
                continue;
            };

            let pushed = self.search_recursive(network, far, bottleneck.min(residual), epoch);
            if pushed != 0 {
                network.augment(index, current, pushed);
                self.path.push(current);
                return pushed;
            }
        }

        0
    }

    fn search_iterative(
        &mut self,
        network: &mut FlowNetwork,
        start: NodeId,
        bottleneck: Capacity,
        epoch: Epoch,
    ) -> Capacity {
        if start == self.drain {
            self.path.push(start);
            return bottleneck;
        }

        self.visit(network, start, epoch);
        let mut stack = vec![Frame {
            vertex: start,
            cursor: 0,
            bottleneck,
            entered_by: None,
        }];

        while let Some(top) = stack.last_mut() {
            let current = top.vertex;
            let Some((next, index)) = network.next_incident(current, self.lookup, top.cursor) else {
                stack.pop();
                continue;
            };
            top.cursor = next;
            let limit = top.bottleneck;

            let Some((far, residual)) = self.admissible(network, current, index, epoch) else {
                continue;
            };
            let carried = limit.min(residual);

            if far == self.drain {
                self.apply_stack_path(network, &stack, index, carried);
                return carried;
            }

            self.visit(network, far, epoch);
            stack.push(Frame {
                vertex: far,
                cursor: 0,
                bottleneck: carried,
                entered_by: Some(index),
            });
        }

        0
    }

    /// Far endpoint and residual of edge `index` if the search may cross it
    /// from `current` in this epoch.
    fn admissible(
        &mut self,
        network: &mut FlowNetwork,
        current: NodeId,
        index: usize,
        epoch: Epoch,
    ) -> Option<(NodeId, Capacity)> {
        self.statistics.edges_examined += 1;

        let edge = network.edge(index);
        let residual = edge.residual_from(current);
        if residual == 0 {
            return None;
        }
        let far = edge.other_endpoint(current);
        if *network.mark_for(far) == epoch {
            return None;
        }
        Some((far, residual))
    }

    fn visit(&mut self, network: &mut FlowNetwork, vertex: NodeId, epoch: Epoch) {
        let mark = network.mark_for(vertex);
        debug_assert_ne!(*mark, epoch, "vertex {} entered twice in epoch {}", vertex, epoch);
        *mark = epoch;

        self.statistics.vertices_visited += 1;
        trace!("epoch {}: visiting vertex {}", epoch, vertex);
        self.record(TraceEvent::Visit { epoch, vertex });
    }

    /// Push `amount` along every frame's entering edge plus the final hop
    /// `last_edge` into the drain.
    fn apply_stack_path(
        &mut self,
        network: &mut FlowNetwork,
        stack: &[Frame],
        last_edge: usize,
        amount: Capacity,
    ) {
        for pair in stack.windows(2) {
            if let Some(edge) = pair[1].entered_by {
                network.augment(edge, pair[0].vertex, amount);
            }
        }
        if let Some(top) = stack.last() {
            network.augment(last_edge, top.vertex, amount);
        }

        self.path.extend(stack.iter().map(|frame| frame.vertex));
        self.path.push(self.drain);
    }
}
