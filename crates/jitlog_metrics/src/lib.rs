//! Compilation time instrumentation for the JIT
//!
//! [`selector`] decides which functions get a detailed breakdown, and
//! [`profiler`] records their nested compilation phases and renders the
//! report once the outermost phase closes.

pub mod profiler;
pub mod selector;

pub use profiler::{
    MemorySink, MonotonicClock, PhaseReport, PhaseTimer, ReportFormatter, ReportSink,
    SteppingClock, TimeSource, TracingSink,
};
pub use selector::{
    FunctionSelector, Pattern, capture_compilation_time_for, configure_global, global_selector,
};
