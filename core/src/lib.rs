//! AUGFLOW core: maximum flow over integral capacity networks
//!
//! A [`FlowNetwork`] is built append-only with `add_edge`, given a source
//! and a drain, and handed to [`max_flow`] or a configured
//! [`MaxFlowSolver`]. The run mutates the network's residual capacities
//! in place, so clone a pristine network for every repeated computation.
//!
//! ```
//! use augflow_core::{max_flow, FlowNetwork};
//!
//! let mut network = FlowNetwork::from_edge_list(0, 2, &[(0, 1, 5), (1, 2, 3)]).unwrap();
//! assert_eq!(max_flow(&mut network).unwrap(), 3);
//! ```

pub mod algorithm;
pub mod data_structures;
pub mod execution;
pub mod validation;

pub use algorithm::graph::{max_flow, MaxFlowResult, MaxFlowSolver, SearchStrategy, SolverConfig};
pub use algorithm::traits::{Algorithm, AlgorithmError, NodeId};
pub use data_structures::flow_network::{Capacity, Edge, FlowError, FlowNetwork, NeighborLookup};
pub use execution::tracer::ExecutionTracer;
