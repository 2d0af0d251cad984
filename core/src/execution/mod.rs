pub mod tracer;

pub use self::tracer::{ExecutionTracer, TraceEvent};
