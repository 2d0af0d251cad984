//! Post-run correctness verification for maximum flow
//!
//! A finished run is checked against the pristine network it started
//! from. The net flow on an edge is recovered from its residuals as
//! `original.forward - residual.forward` (positive means a -> b), which is
//! enough to verify:
//!
//! - capacity bounds: residuals stay non-negative and each edge keeps the
//!   sum of its two residuals;
//! - conservation: every vertex other than the terminals balances, and
//!   the source emits exactly what the drain absorbs;
//! - optimality: the reported source side of the cut has crossing
//!   capacity equal to the flow value.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::algorithm::graph::max_flow::MaxFlowResult;
use crate::algorithm::traits::NodeId;
use crate::data_structures::flow_network::{Capacity, FlowError, FlowNetwork};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Networks differ in shape at edge {0}")]
    ShapeMismatch(usize),

    #[error("Edge {edge} has negative residual ({forward}, {reverse})")]
    NegativeResidual {
        edge: usize,
        forward: Capacity,
        reverse: Capacity,
    },

    #[error("Edge {edge} total capacity changed from {expected} to {actual}")]
    CapacityNotConserved {
        edge: usize,
        expected: Capacity,
        actual: Capacity,
    },

    #[error("Vertex {vertex} has net inflow {actual}, expected {expected}")]
    Imbalance {
        vertex: NodeId,
        expected: Capacity,
        actual: Capacity,
    },

    #[error("Cut capacity {cut_capacity} differs from flow {flow}")]
    CutMismatch { cut_capacity: Capacity, flow: Capacity },

    #[error("Cut side contains the drain {0}")]
    DrainInCut(NodeId),

    #[error(transparent)]
    Network(#[from] FlowError),
}

/// Net flow pushed a -> b along every edge, in edge order
pub fn edge_flows(original: &FlowNetwork, residual: &FlowNetwork) -> Result<Vec<Capacity>, ValidationError> {
    if original.edge_count() != residual.edge_count() {
        return Err(ValidationError::ShapeMismatch(
            original.edge_count().min(residual.edge_count()),
        ));
    }

    original
        .edges()
        .iter()
        .zip(residual.edges())
        .enumerate()
        .map(|(index, (before, after))| {
            if before.endpoint_a != after.endpoint_a || before.endpoint_b != after.endpoint_b {
                return Err(ValidationError::ShapeMismatch(index));
            }
            Ok(before.forward - after.forward)
        })
        .collect()
}

pub fn verify_capacity_bounds(original: &FlowNetwork, residual: &FlowNetwork) -> Result<(), ValidationError> {
    edge_flows(original, residual)?;

    for (edge, (before, after)) in original.edges().iter().zip(residual.edges()).enumerate() {
        if after.forward < 0 || after.reverse < 0 {
            return Err(ValidationError::NegativeResidual {
                edge,
                forward: after.forward,
                reverse: after.reverse,
            });
        }
        if before.total_capacity() != after.total_capacity() {
            return Err(ValidationError::CapacityNotConserved {
                edge,
                expected: before.total_capacity(),
                actual: after.total_capacity(),
            });
        }
    }
    Ok(())
}

/// Net inflow per vertex implied by the residual state
pub fn vertex_balances(
    original: &FlowNetwork,
    residual: &FlowNetwork,
) -> Result<HashMap<NodeId, Capacity>, ValidationError> {
    let flows = edge_flows(original, residual)?;
    let mut balances: HashMap<NodeId, Capacity> = HashMap::new();

    for (edge, flow) in original.edges().iter().zip(flows) {
        *balances.entry(edge.endpoint_a).or_default() -= flow;
        *balances.entry(edge.endpoint_b).or_default() += flow;
    }
    Ok(balances)
}

pub fn verify_conservation(
    original: &FlowNetwork,
    residual: &FlowNetwork,
    value: Capacity,
) -> Result<(), ValidationError> {
    let (source, drain) = original.validate_terminals()?;

    for (vertex, actual) in vertex_balances(original, residual)? {
        let expected = if vertex == source {
            -value
        } else if vertex == drain {
            value
        } else {
            0
        };
        if actual != expected {
            return Err(ValidationError::Imbalance {
                vertex,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Original capacity leaving `source_side` across the cut
pub fn cut_capacity(original: &FlowNetwork, source_side: &[NodeId]) -> Capacity {
    let side: HashSet<NodeId> = source_side.iter().copied().collect();

    original
        .edges()
        .iter()
        .map(|edge| {
            match (side.contains(&edge.endpoint_a), side.contains(&edge.endpoint_b)) {
                (true, false) => edge.forward,
                (false, true) => edge.reverse,
                _ => 0,
            }
        })
        .sum()
}

pub fn verify_min_cut(
    original: &FlowNetwork,
    source_side: &[NodeId],
    value: Capacity,
) -> Result<(), ValidationError> {
    let (_, drain) = original.validate_terminals()?;
    if source_side.contains(&drain) {
        return Err(ValidationError::DrainInCut(drain));
    }

    let cut_capacity = cut_capacity(original, source_side);
    if cut_capacity != value {
        return Err(ValidationError::CutMismatch {
            cut_capacity,
            flow: value,
        });
    }
    Ok(())
}

/// Every check at once
pub fn verify_run(
    original: &FlowNetwork,
    residual: &FlowNetwork,
    result: &MaxFlowResult,
) -> Result<(), ValidationError> {
    verify_capacity_bounds(original, residual)?;
    verify_conservation(original, residual, result.max_flow)?;
    verify_min_cut(original, &result.min_cut, result.max_flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::graph::augmenting_path::SearchStrategy;
    use crate::algorithm::graph::max_flow::{MaxFlowSolver, SolverConfig};
    use crate::data_structures::flow_network::NeighborLookup;

    fn reference_network() -> FlowNetwork {
        FlowNetwork::from_edge_list(
            0,
            4,
            &[
                (0, 1, 100),
                (0, 2, 1000),
                (1, 3, 150),
                (2, 3, 100),
                (2, 4, 500),
                (3, 4, 250),
                (0, 5, 150),
                (5, 3, 10),
                (5, 2, 150),
                (5, 4, 50),
                (2, 6, 500),
                (6, 7, 450),
                (7, 4, 150),
                (7, 8, 50),
                (8, 4, 25),
                (8, 3, 25),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_completed_run_passes_every_check() {
        for strategy in [SearchStrategy::Recursive, SearchStrategy::ExplicitStack] {
            let original = reference_network();
            let mut residual = original.clone();
            let config = SolverConfig {
                strategy,
                neighbor_lookup: NeighborLookup::LinearScan,
                record_paths: false,
            };

            let result = MaxFlowSolver::new(config).solve(&mut residual).unwrap();

            assert_eq!(result.max_flow, 960);
            verify_run(&original, &residual, &result).unwrap();
        }
    }

    #[test]
    fn test_untouched_network_balances_at_zero() {
        let original = reference_network();
        let residual = original.clone();

        verify_capacity_bounds(&original, &residual).unwrap();
        verify_conservation(&original, &residual, 0).unwrap();
        assert!(matches!(
            verify_conservation(&original, &residual, 5),
            Err(ValidationError::Imbalance { .. })
        ));
    }

    #[test]
    fn test_partial_push_breaks_conservation() {
        let original = FlowNetwork::from_edge_list(0, 2, &[(0, 1, 5), (1, 2, 5)]).unwrap();
        let mut residual = original.clone();
        // flow into 1 that never leaves it
        residual.augment(0, NodeId(0), 3);

        verify_capacity_bounds(&original, &residual).unwrap();
        let err = verify_conservation(&original, &residual, 3).unwrap_err();
        assert!(matches!(err, ValidationError::Imbalance { .. }));
    }

    #[test]
    fn test_tampered_capacity_detected() {
        let original = FlowNetwork::from_edge_list(0, 1, &[(0, 1, 5)]).unwrap();
        let mut residual = original.clone();
        *residual.edge_mut(0).flow_from(NodeId(0)) -= 7;

        assert!(matches!(
            verify_capacity_bounds(&original, &residual),
            Err(ValidationError::NegativeResidual { edge: 0, .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_detected() {
        let original = FlowNetwork::from_edge_list(0, 1, &[(0, 1, 5)]).unwrap();
        let other = FlowNetwork::from_edge_list(0, 1, &[(1, 0, 5)]).unwrap();

        assert!(matches!(
            verify_capacity_bounds(&original, &other),
            Err(ValidationError::ShapeMismatch(0))
        ));
    }

    #[test]
    fn test_cut_capacity_counts_leaving_direction_only() {
        let network =
            FlowNetwork::from_edge_list(0, 2, &[(0, 1, 4), (2, 0, 9), (1, 2, 6)]).unwrap();

        assert_eq!(cut_capacity(&network, &[NodeId(0)]), 4);
        assert_eq!(cut_capacity(&network, &[NodeId(0), NodeId(1)]), 6);
        assert!(verify_min_cut(&network, &[NodeId(0)], 4).is_ok());
        assert!(matches!(
            verify_min_cut(&network, &[NodeId(0)], 5),
            Err(ValidationError::CutMismatch { .. })
        ));
        assert!(matches!(
            verify_min_cut(&network, &[NodeId(0), NodeId(2)], 4),
            Err(ValidationError::DrainInCut(NodeId(2)))
        ));
    }
}
