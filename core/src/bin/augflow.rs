//! Command-line driver: `augflow [network.json] [config.json]`
//!
//! Without a network file the 11-vertex reference network is solved.

use std::error::Error;
use std::fs;

use augflow_core::validation::verify_run;
use augflow_core::{Capacity, FlowNetwork, MaxFlowSolver, SolverConfig};
use log::info;

const REFERENCE_EDGES: [(u32, u32, Capacity); 12] = [
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
];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let network = match args.next() {
        Some(path) => {
            info!("loading network from {}", path);
            FlowNetwork::from_json(&fs::read_to_string(path)?)?
        }
        None => FlowNetwork::from_edge_list(0, 4, &REFERENCE_EDGES)?,
    };
    let config = match args.next() {
        Some(path) => SolverConfig::from_json(&fs::read_to_string(path)?)?,
        None => SolverConfig::default(),
    };

    let mut residual = network.clone();
    let result = MaxFlowSolver::new(config).solve(&mut residual)?;
    verify_run(&network, &residual, &result)?;

    println!("max flow: {}", result.max_flow);
    println!("augmentations: {}", result.metrics.augmentations);
    let cut: Vec<String> = result.min_cut.iter().map(|v| v.to_string()).collect();
    println!("min cut source side: {{{}}}", cut.join(", "));
    for path in &result.flow_paths {
        let hops: Vec<String> = path.path.iter().map(|v| v.to_string()).collect();
        println!("  {} via {}", path.flow, hops.join(" -> "));
    }

    Ok(())
}
