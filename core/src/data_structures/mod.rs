pub mod flow_network;

pub use self::flow_network::{Capacity, Edge, Epoch, FlowError, FlowNetwork, NeighborLookup, NetworkDescription};
