// Compilation Phase Profiling Infrastructure
pub mod clock;
pub mod report;
pub mod sink;
pub mod timer;
pub mod tree;

pub use clock::{MonotonicClock, SteppingClock, TimeSource};
pub use report::{PhaseReport, ReportFormatter, ReportRow};
pub use sink::{MemorySink, ReportSink, TracingSink};
pub use timer::PhaseTimer;
pub use tree::{PhaseId, PhaseNode, PhaseTree};
