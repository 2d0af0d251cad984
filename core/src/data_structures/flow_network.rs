//! Capacity network with direction-dependent residual bookkeeping
//!
//! Every physical connection is a single [`Edge`] record carrying two
//! independent residual capacities, one per direction. The network owns
//! all edges; searches address them by position, so no edge is ever
//! aliased outside the network.
//!
//! Incident edges can be enumerated either by scanning the whole edge
//! list or through an adjacency index maintained on insertion. Both
//! enumerate in edge insertion order, which fixes the augmenting path a
//! depth-first search discovers first.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::NodeId;

/// Residual capacity; integral so that augmentation terminates
pub type Capacity = i64;

/// Search epoch used to mark visited vertices
pub type Epoch = u64;

/// Mark value of a vertex that no search has visited yet
pub const UNVISITED: Epoch = 0;

/// Errors raised while building a network or preparing it for a run
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Negative capacity {capacity} on edge {a} - {b}")]
    NegativeCapacity { a: NodeId, b: NodeId, capacity: Capacity },

    #[error("Network has no {0} vertex")]
    MissingTerminal(&'static str),

    #[error("Source and drain are the same vertex {0}")]
    SourceIsDrain(NodeId),

    #[error("Vertex {0} does not appear in the network")]
    UnknownVertex(NodeId),

    #[error("Accumulated flow overflows the capacity type")]
    FlowOverflow,

    #[error("Malformed network description: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Strategy for enumerating the edges incident to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborLookup {
    /// Filter the full edge list on every call, O(E)
    LinearScan,
    /// Walk the per-vertex index built on insertion, O(degree)
    #[default]
    Indexed,
}

/// Connection between two vertices with one residual capacity per direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub endpoint_a: NodeId,
    pub endpoint_b: NodeId,
    /// Residual capacity a -> b
    pub forward: Capacity,
    /// Residual capacity b -> a
    pub reverse: Capacity,
}

impl Edge {
    pub fn new(endpoint_a: NodeId, endpoint_b: NodeId, capacity: Capacity) -> Self {
        Self {
            endpoint_a,
            endpoint_b,
            forward: capacity,
            reverse: 0,
        }
    }

    /// Residual capacity for flow leaving `vertex` along this edge.
    ///
    /// # Panics
    /// If `vertex` is not an endpoint of this edge.
    pub fn flow_from(&mut self, vertex: NodeId) -> &mut Capacity {
        if vertex == self.endpoint_a {
            &mut self.forward
        } else if vertex == self.endpoint_b {
            &mut self.reverse
        } else {
            self.malformed(vertex)
        }
    }

    /// Residual capacity for flow arriving at `vertex`, the complement of
    /// [`Edge::flow_from`].
    ///
    /// # Panics
    /// If `vertex` is not an endpoint of this edge.
    pub fn flow_towards(&mut self, vertex: NodeId) -> &mut Capacity {
        if vertex == self.endpoint_a {
            &mut self.reverse
        } else if vertex == self.endpoint_b {
            &mut self.forward
        } else {
            self.malformed(vertex)
        }
    }

    /// Read-only view of [`Edge::flow_from`]
    pub fn residual_from(&self, vertex: NodeId) -> Capacity {
        if vertex == self.endpoint_a {
            self.forward
        } else if vertex == self.endpoint_b {
            self.reverse
        } else {
            self.malformed(vertex)
        }
    }

    /// # Panics
    /// If `vertex` is not an endpoint of this edge.
    pub fn other_endpoint(&self, vertex: NodeId) -> NodeId {
        if vertex == self.endpoint_a {
            self.endpoint_b
        } else if vertex == self.endpoint_b {
            self.endpoint_a
        } else {
            self.malformed(vertex)
        }
    }

    #[inline]
    pub fn is_incident(&self, vertex: NodeId) -> bool {
        self.endpoint_a == vertex || self.endpoint_b == vertex
    }

    /// Sum of both residuals; constant across augmentations
    #[inline]
    pub fn total_capacity(&self) -> Capacity {
        self.forward + self.reverse
    }

    fn malformed(&self, vertex: NodeId) -> ! {
        panic!(
            "vertex {} is not an endpoint of edge {} - {}",
            vertex, self.endpoint_a, self.endpoint_b
        )
    }
}

/// Serializable description of a network, as read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    #[serde(default)]
    pub source: Option<NodeId>,
    #[serde(default)]
    pub drain: Option<NodeId>,
    pub edges: Vec<EdgeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDescription {
    pub a: NodeId,
    pub b: NodeId,
    pub capacity: Capacity,
}

/// Flow network: edges in insertion order plus per-vertex search marks
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork {
    edges: Vec<Edge>,
    /// Edge positions incident to each vertex, in insertion order
    adjacency: HashMap<NodeId, Vec<usize>>,
    /// Last epoch that visited each vertex; grows lazily
    marks: HashMap<NodeId, Epoch>,
    source: Option<NodeId>,
    drain: Option<NodeId>,
}

impl FlowNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from its description, validating every capacity
    pub fn from_description(description: &NetworkDescription) -> Result<Self, FlowError> {
        let mut network = Self::new();
        for edge in &description.edges {
            network.add_edge(edge.a, edge.b, edge.capacity)?;
        }
        network.source = description.source;
        network.drain = description.drain;
        Ok(network)
    }

    /// Build a network from `(a, b, capacity)` triples with the given terminals
    pub fn from_edge_list(
        source: u32,
        drain: u32,
        edges: &[(u32, u32, Capacity)],
    ) -> Result<Self, FlowError> {
        let mut network = Self::new();
        for &(a, b, capacity) in edges {
            network.add_edge(NodeId(a), NodeId(b), capacity)?;
        }
        network.set_terminals(NodeId(source), NodeId(drain));
        Ok(network)
    }

    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let description: NetworkDescription = serde_json::from_str(json)?;
        Self::from_description(&description)
    }

    /// Append an edge with forward residual `capacity` and no reverse
    /// residual. Returns the new edge's position.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        capacity: Capacity,
    ) -> Result<usize, FlowError> {
        if capacity < 0 {
            warn!("rejecting edge {} - {} with capacity {}", a, b, capacity);
            return Err(FlowError::NegativeCapacity { a, b, capacity });
        }

        let index = self.edges.len();
        self.edges.push(Edge::new(a, b, capacity));
        self.adjacency.entry(a).or_default().push(index);
        if b != a {
            self.adjacency.entry(b).or_default().push(index);
        }
        Ok(index)
    }

    pub fn set_source(&mut self, source: NodeId) {
        self.source = Some(source);
    }

    pub fn set_drain(&mut self, drain: NodeId) {
        self.drain = Some(drain);
    }

    pub fn set_terminals(&mut self, source: NodeId, drain: NodeId) {
        self.set_source(source);
        self.set_drain(drain);
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn drain(&self) -> Option<NodeId> {
        self.drain
    }

    /// Check that both terminals are set, distinct and part of the network
    pub fn validate_terminals(&self) -> Result<(NodeId, NodeId), FlowError> {
        let source = self.source.ok_or(FlowError::MissingTerminal("source"))?;
        let drain = self.drain.ok_or(FlowError::MissingTerminal("drain"))?;
        if source == drain {
            return Err(FlowError::SourceIsDrain(source));
        }
        for vertex in [source, drain] {
            if !self.contains_vertex(vertex) {
                return Err(FlowError::UnknownVertex(vertex));
            }
        }
        Ok((source, drain))
    }

    pub fn contains_vertex(&self, vertex: NodeId) -> bool {
        self.adjacency.contains_key(&vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge at insertion position `index`.
    ///
    /// # Panics
    /// If `index` is not below [`FlowNetwork::edge_count`].
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    pub(crate) fn edge_mut(&mut self, index: usize) -> &mut Edge {
        &mut self.edges[index]
    }

    /// Stored mark for `vertex`, creating an unvisited entry on first access
    pub fn mark_for(&mut self, vertex: NodeId) -> &mut Epoch {
        self.marks.entry(vertex).or_insert(UNVISITED)
    }

    /// Read-only mark lookup; absent vertices report [`UNVISITED`]
    pub fn mark_of(&self, vertex: NodeId) -> Epoch {
        self.marks.get(&vertex).copied().unwrap_or(UNVISITED)
    }

    /// Forget every mark so a new run can restart its epochs at 1
    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }

    /// Vertices whose mark equals `epoch`, sorted
    pub fn vertices_marked_in(&self, epoch: Epoch) -> Vec<NodeId> {
        let mut vertices: Vec<NodeId> = self
            .marks
            .iter()
            .filter(|&(_, &mark)| mark == epoch)
            .map(|(&vertex, _)| vertex)
            .collect();
        vertices.sort_unstable();
        vertices
    }

    /// Edges incident to `vertex` by linear scan, in insertion order.
    /// Recomputed on every call.
    pub fn neighbors_of(&self, vertex: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |edge| edge.is_incident(vertex))
    }

    /// Positions of the edges incident to `vertex`, in insertion order
    pub fn incident_edges(
        &self,
        vertex: NodeId,
        lookup: NeighborLookup,
    ) -> impl Iterator<Item = usize> + '_ {
        let mut cursor = 0;
        std::iter::from_fn(move || {
            let (next, index) = self.next_incident(vertex, lookup, cursor)?;
            cursor = next;
            Some(index)
        })
    }

    /// Resumable incident-edge enumeration. `cursor` starts at 0; returns
    /// the cursor to resume from together with the next edge position.
    ///
    /// Holding a cursor instead of a borrowing iterator lets callers mutate
    /// residuals between steps.
    pub(crate) fn next_incident(
        &self,
        vertex: NodeId,
        lookup: NeighborLookup,
        cursor: usize,
    ) -> Option<(usize, usize)> {
        match lookup {
            NeighborLookup::LinearScan => self.edges[cursor..]
                .iter()
                .position(|edge| edge.is_incident(vertex))
                .map(|offset| (cursor + offset + 1, cursor + offset)),
            NeighborLookup::Indexed => self
                .adjacency
                .get(&vertex)
                .and_then(|positions| positions.get(cursor))
                .map(|&index| (cursor + 1, index)),
        }
    }

    /// Push `amount` along edge `index` leaving `from`: the traversed
    /// direction loses `amount`, the opposite direction gains it.
    pub(crate) fn augment(&mut self, index: usize, from: NodeId, amount: Capacity) {
        let edge = self.edge_mut(index);
        *edge.flow_from(from) -= amount;
        *edge.flow_towards(from) += amount;
        debug_assert!(edge.forward >= 0 && edge.reverse >= 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_network() -> FlowNetwork {
        FlowNetwork::from_edge_list(
            0,
            4,
            &[(0, 1, 100), (0, 2, 1000), (1, 3, 150), (2, 3, 100), (2, 4, 500), (3, 4, 250)],
        )
        .unwrap()
    }

    #[test]
    fn test_edge_direction_accessors() {
        let mut edge = Edge::new(NodeId(1), NodeId(2), 10);

        assert_eq!(*edge.flow_from(NodeId(1)), 10);
        assert_eq!(*edge.flow_from(NodeId(2)), 0);
        assert_eq!(*edge.flow_towards(NodeId(2)), 10);
        assert_eq!(*edge.flow_towards(NodeId(1)), 0);
        assert_eq!(edge.other_endpoint(NodeId(1)), NodeId(2));
        assert_eq!(edge.other_endpoint(NodeId(2)), NodeId(1));

        *edge.flow_from(NodeId(1)) -= 4;
        *edge.flow_towards(NodeId(1)) += 4;
        assert_eq!(edge.forward, 6);
        assert_eq!(edge.reverse, 4);
        assert_eq!(edge.residual_from(NodeId(2)), 4);
        assert_eq!(edge.total_capacity(), 10);
    }

    #[test]
    #[should_panic(expected = "not an endpoint")]
    fn test_edge_rejects_foreign_vertex() {
        let mut edge = Edge::new(NodeId(1), NodeId(2), 10);
        edge.flow_from(NodeId(3));
    }

    #[test]
    #[should_panic(expected = "not an endpoint")]
    fn test_other_endpoint_rejects_foreign_vertex() {
        let edge = Edge::new(NodeId(1), NodeId(2), 10);
        edge.other_endpoint(NodeId(9));
    }

    #[test]
    fn test_add_edge_rejects_negative_capacity() {
        let mut network = FlowNetwork::new();
        let err = network.add_edge(NodeId(0), NodeId(1), -5).unwrap_err();

        assert!(matches!(
            err,
            FlowError::NegativeCapacity { capacity: -5, .. }
        ));
        assert_eq!(network.edge_count(), 0);
        assert!(!network.contains_vertex(NodeId(0)));
    }

    #[test]
    fn test_add_edge_preserves_insertion_order() {
        let network = scenario_network();

        assert_eq!(network.edge_count(), 6);
        assert_eq!(network.vertex_count(), 5);
        assert_eq!(network.edge(4).endpoint_a, NodeId(2));
        assert_eq!(network.edge(4).endpoint_b, NodeId(4));
        assert_eq!(network.edge(4).forward, 500);
        assert_eq!(network.edge(4).reverse, 0);
    }

    #[test]
    #[should_panic]
    fn test_edge_out_of_range_panics() {
        let network = scenario_network();
        network.edge(network.edge_count());
    }

    #[test]
    fn test_neighbors_follow_insertion_order() {
        let network = scenario_network();

        let neighbors: Vec<NodeId> = network
            .neighbors_of(NodeId(2))
            .map(|edge| edge.other_endpoint(NodeId(2)))
            .collect();
        assert_eq!(neighbors, vec![NodeId(0), NodeId(3), NodeId(4)]);

        // calling again recomputes the same sequence
        assert_eq!(network.neighbors_of(NodeId(2)).count(), 3);
        assert_eq!(network.neighbors_of(NodeId(42)).count(), 0);
    }

    #[test]
    fn test_lookup_strategies_agree() {
        let mut network = scenario_network();
        network.add_edge(NodeId(3), NodeId(3), 7).unwrap();

        for vertex in 0..6 {
            let scanned: Vec<usize> = network
                .incident_edges(NodeId(vertex), NeighborLookup::LinearScan)
                .collect();
            let indexed: Vec<usize> = network
                .incident_edges(NodeId(vertex), NeighborLookup::Indexed)
                .collect();
            assert_eq!(scanned, indexed, "vertex {}", vertex);
        }

        let at_three: Vec<usize> = network
            .incident_edges(NodeId(3), NeighborLookup::Indexed)
            .collect();
        assert_eq!(at_three, vec![2, 3, 5, 6]);
    }

    #[test]
    fn test_mark_for_is_lazy() {
        let mut network = scenario_network();

        assert_eq!(network.mark_of(NodeId(3)), UNVISITED);
        assert_eq!(*network.mark_for(NodeId(3)), UNVISITED);

        *network.mark_for(NodeId(3)) = 2;
        *network.mark_for(NodeId(1)) = 2;
        *network.mark_for(NodeId(0)) = 1;

        assert_eq!(network.mark_of(NodeId(3)), 2);
        assert_eq!(network.vertices_marked_in(2), vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn test_augment_moves_residual_to_reverse() {
        let mut network = scenario_network();

        network.augment(2, NodeId(1), 60);
        assert_eq!(network.edge(2).forward, 90);
        assert_eq!(network.edge(2).reverse, 60);

        // cancel part of it from the far side
        network.augment(2, NodeId(3), 20);
        assert_eq!(network.edge(2).forward, 110);
        assert_eq!(network.edge(2).reverse, 40);
        assert_eq!(network.edge(2).total_capacity(), 150);
    }

    #[test]
    fn test_terminal_validation() {
        let mut network = scenario_network();
        assert_eq!(
            network.validate_terminals().unwrap(),
            (NodeId(0), NodeId(4))
        );

        network.set_drain(NodeId(0));
        assert!(matches!(
            network.validate_terminals(),
            Err(FlowError::SourceIsDrain(NodeId(0)))
        ));

        network.set_drain(NodeId(9));
        assert!(matches!(
            network.validate_terminals(),
            Err(FlowError::UnknownVertex(NodeId(9)))
        ));

        let empty = FlowNetwork::new();
        assert!(matches!(
            empty.validate_terminals(),
            Err(FlowError::MissingTerminal("source"))
        ));
    }

    #[test]
    fn test_network_from_json() {
        let json = r#"{
            "source": 0,
            "drain": 2,
            "edges": [
                { "a": 0, "b": 1, "capacity": 5 },
                { "a": 1, "b": 2, "capacity": 3 }
            ]
        }"#;

        let network = FlowNetwork::from_json(json).unwrap();
        assert_eq!(network.edge_count(), 2);
        assert_eq!(network.source(), Some(NodeId(0)));
        assert_eq!(network.drain(), Some(NodeId(2)));

        let negative = r#"{ "edges": [ { "a": 0, "b": 1, "capacity": -1 } ] }"#;
        assert!(matches!(
            FlowNetwork::from_json(negative),
            Err(FlowError::NegativeCapacity { .. })
        ));

        assert!(matches!(
            FlowNetwork::from_json("{ \"edges\": 3 }"),
            Err(FlowError::Parse(_))
        ));
    }
}
