//! Correctness checks for completed runs

pub mod correctness;

pub use self::correctness::{verify_run, ValidationError};
