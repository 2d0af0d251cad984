//! Graph flow algorithms
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod augmenting_path;
pub mod max_flow;

pub use self::augmenting_path::{AugmentingPathSearch, SearchStatistics, SearchStrategy, UNBOUNDED};
pub use self::max_flow::{max_flow, FlowMetrics, FlowPath, MaxFlowResult, MaxFlowSolver, SolverConfig};
