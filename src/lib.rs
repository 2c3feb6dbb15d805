//! jitlog: per-function compilation phase timing for a JIT
//!
//! The driver consults a wildcard selector for each function it compiles and,
//! for the functions that opt in, records every compilation phase and logs a
//! breakdown of where the time went.

pub mod cli;
pub mod driver;

pub use driver::{CompilationDriver, CompileJob, CompiledFunction, Pipeline, timed};
pub use jitlog_config::{ReportFormat, TimeLogConfig};
pub use jitlog_metrics::{FunctionSelector, PhaseReport, PhaseTimer};
