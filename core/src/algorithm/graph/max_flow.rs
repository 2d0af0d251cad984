//! Maximum Flow by Repeated Augmenting Paths
//!
//! This module implements Ford-Fulkerson with depth-first path discovery.
//! Each epoch runs one [`AugmentingPathSearch`] from the source with an
//! unbounded initial bottleneck; the run ends with the first epoch that
//! finds nothing. With integral capacities every successful epoch adds at
//! least one unit of flow, so the number of epochs never exceeds the flow
//! value.
//!
//! A run consumes the residual state of its network. Re-running on the
//! same network continues from that state (and finds nothing more); run on
//! a fresh clone to repeat a computation.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::graph::augmenting_path::{AugmentingPathSearch, SearchStrategy, UNBOUNDED};
use crate::algorithm::traits::{Algorithm, AlgorithmError, AlgorithmParameter, NodeId, ParameterType};
use crate::data_structures::flow_network::{Capacity, Epoch, FlowError, FlowNetwork, NeighborLookup};
use crate::execution::tracer::{ExecutionTracer, TraceEvent};

/// First epoch of every run; [`crate::data_structures::flow_network::UNVISITED`] is 0
pub const FIRST_EPOCH: Epoch = 1;

/// Solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Frame management of the depth-first search
    pub strategy: SearchStrategy,
    /// Incident-edge enumeration
    pub neighbor_lookup: NeighborLookup,
    /// Keep every augmenting path in the result
    pub record_paths: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Recursive,
            neighbor_lookup: NeighborLookup::Indexed,
            record_paths: true,
        }
    }
}

impl SolverConfig {
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        serde_json::from_str(json).map_err(|e| AlgorithmError::Configuration(e.to_string()))
    }
}

/// Flow path representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowPath {
    /// Path vertices, source first
    pub path: Vec<NodeId>,
    /// Flow amount along path
    pub flow: Capacity,
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of successful epochs
    pub augmentations: usize,
    /// Vertex entries across all epochs, including the final failing one
    pub vertices_visited: usize,
    /// Incident edges inspected across all epochs
    pub edges_examined: usize,
    /// Algorithm execution time
    pub execution_time_ms: f64,
}

/// Maximum flow result with detailed flow information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxFlowResult {
    /// Maximum flow value
    pub max_flow: Capacity,
    /// Flow pushed by each successful epoch, in order
    pub bottlenecks: Vec<Capacity>,
    /// Augmenting paths, when recording is enabled
    pub flow_paths: Vec<FlowPath>,
    /// Source side of a minimum cut, sorted
    pub min_cut: Vec<NodeId>,
    /// Algorithm performance metrics
    pub metrics: FlowMetrics,
}

/// Compute the maximum flow of `network` with the default configuration
pub fn max_flow(network: &mut FlowNetwork) -> Result<Capacity, FlowError> {
    MaxFlowSolver::default()
        .solve(network)
        .map(|result| result.max_flow)
}

/// Ford-Fulkerson solver
#[derive(Debug, Clone, Default)]
pub struct MaxFlowSolver {
    config: SolverConfig,
}

impl MaxFlowSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run to completion on `network`, mutating its residual capacities.
    ///
    /// On error the network is left as it was mid-run: a
    /// [`FlowError::FlowOverflow`] is raised after the overflowing path has
    /// already been applied, so every augmentation up to and including it
    /// stays in the residuals.
    pub fn solve(&self, network: &mut FlowNetwork) -> Result<MaxFlowResult, FlowError> {
        self.run(network, None)
    }

    /// Same as [`MaxFlowSolver::solve`], recording every step into `tracer`
    pub fn execute_with_tracing(
        &self,
        network: &mut FlowNetwork,
        tracer: &mut ExecutionTracer,
    ) -> Result<MaxFlowResult, FlowError> {
        self.run(network, Some(tracer))
    }

    /// Solve independent networks in parallel; results keep input order
    pub fn solve_batch(&self, networks: Vec<FlowNetwork>) -> Vec<Result<MaxFlowResult, FlowError>> {
        networks
            .into_par_iter()
            .map(|mut network| self.solve(&mut network))
            .collect()
    }

    fn run(
        &self,
        network: &mut FlowNetwork,
        tracer: Option<&mut ExecutionTracer>,
    ) -> Result<MaxFlowResult, FlowError> {
        let (source, drain) = network.validate_terminals().map_err(|err| {
            warn!("rejecting network: {}", err);
            err
        })?;

        info!(
            "max flow {} -> {} over {} vertices, {} edges ({} search, {:?} lookup)",
            source,
            drain,
            network.vertex_count(),
            network.edge_count(),
            self.config.strategy.as_str(),
            self.config.neighbor_lookup
        );

        let started = Instant::now();
        network.clear_marks();

        let mut search =
            AugmentingPathSearch::new(drain, self.config.strategy, self.config.neighbor_lookup);
        if let Some(tracer) = tracer {
            search = search.with_tracer(tracer);
        }

        let mut epoch = FIRST_EPOCH;
        let mut total: Capacity = 0;
        let mut bottlenecks = Vec::new();
        let mut flow_paths = Vec::new();

        loop {
            let pushed = search.search(network, source, UNBOUNDED, epoch);
            if pushed == 0 {
                search.record(TraceEvent::Exhausted { epoch });
                break;
            }

            total = total.checked_add(pushed).ok_or(FlowError::FlowOverflow)?;
            debug!(
                "epoch {}: pushed {} along {} vertices, total {}",
                epoch,
                pushed,
                search.last_path().len(),
                total
            );

            if search.tracing() {
                let path = search.last_path().to_vec();
                search.record(TraceEvent::Augment {
                    epoch,
                    bottleneck: pushed,
                    path,
                });
            }
            if self.config.record_paths {
                flow_paths.push(FlowPath {
                    path: search.last_path().to_vec(),
                    flow: pushed,
                });
            }
            bottlenecks.push(pushed);
            epoch += 1;
        }

        // the failing epoch marked exactly what the source still reaches
        let min_cut = network.vertices_marked_in(epoch);
        let statistics = search.statistics();
        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        info!(
            "max flow {} after {} augmentations in {:.3} ms",
            total,
            bottlenecks.len(),
            execution_time_ms
        );

        Ok(MaxFlowResult {
            max_flow: total,
            metrics: FlowMetrics {
                augmentations: bottlenecks.len(),
                vertices_visited: statistics.vertices_visited,
                edges_examined: statistics.edges_examined,
                execution_time_ms,
            },
            bottlenecks,
            flow_paths,
            min_cut,
        })
    }
}

impl Algorithm for MaxFlowSolver {
    fn name(&self) -> &'static str {
        "Ford-Fulkerson"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> &'static str {
        "Ford-Fulkerson maximum flow with depth-first augmenting paths over integral \
         residual capacities. Runs at most |f| epochs of O(V + E) each with indexed \
         neighbor lookup."
    }

    fn parameters(&self) -> Vec<AlgorithmParameter> {
        vec![
            AlgorithmParameter {
                name: "strategy".to_string(),
                value: self.config.strategy.as_str().to_string(),
                value_type: choice(&["recursive", "explicit_stack"]),
            },
            AlgorithmParameter {
                name: "neighbor_lookup".to_string(),
                value: lookup_name(self.config.neighbor_lookup).to_string(),
                value_type: choice(&["linear_scan", "indexed"]),
            },
            AlgorithmParameter {
                name: "record_paths".to_string(),
                value: self.config.record_paths.to_string(),
                value_type: ParameterType::Boolean,
            },
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "strategy" => {
                self.config.strategy = match value {
                    "recursive" => SearchStrategy::Recursive,
                    "explicit_stack" => SearchStrategy::ExplicitStack,
                    _ => {
                        return Err(AlgorithmError::invalid(
                            name,
                            "strategy must be recursive or explicit_stack",
                        ))
                    }
                };
                Ok(())
            }
            "neighbor_lookup" => {
                self.config.neighbor_lookup = match value {
                    "linear_scan" => NeighborLookup::LinearScan,
                    "indexed" => NeighborLookup::Indexed,
                    _ => {
                        return Err(AlgorithmError::invalid(
                            name,
                            "neighbor_lookup must be linear_scan or indexed",
                        ))
                    }
                };
                Ok(())
            }
            "record_paths" => {
                self.config.record_paths = value
                    .parse::<bool>()
                    .map_err(|_| AlgorithmError::invalid(name, "record_paths must be true or false"))?;
                Ok(())
            }
            _ => Err(AlgorithmError::invalid(name, "unknown parameter")),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "strategy" => Some(self.config.strategy.as_str().to_string()),
            "neighbor_lookup" => Some(lookup_name(self.config.neighbor_lookup).to_string()),
            "record_paths" => Some(self.config.record_paths.to_string()),
            _ => None,
        }
    }
}

fn choice(values: &[&str]) -> ParameterType {
    ParameterType::Enum(values.iter().map(|v| v.to_string()).collect())
}

fn lookup_name(lookup: NeighborLookup) -> &'static str {
    match lookup {
        NeighborLookup::LinearScan => "linear_scan",
        NeighborLookup::Indexed => "indexed",
    }
}
