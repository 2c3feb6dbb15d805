//! Nested phase timing for a single compilation

use std::sync::Arc;

use super::clock::{MonotonicClock, TimeSource};
use super::report::{PhaseReport, ReportFormatter};
use super::sink::{ReportSink, TracingSink};
use super::tree::{PhaseId, PhaseTree};

/// Records nested compilation phases for one function.
///
/// Phases are opened with [`start`](Self::start) and closed with
/// [`end`](Self::end) in LIFO order. Closing the outermost phase formats the
/// tree, hands the report to the sink and returns the timer to idle.
///
/// A timer belongs to one compilation on one thread; give every compiler
/// worker its own instance.
pub struct PhaseTimer {
    function_name: String,
    tree: Option<PhaseTree>,
    open: Vec<PhaseId>,
    clock: Box<dyn TimeSource>,
    sink: Arc<dyn ReportSink>,
}

impl PhaseTimer {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            tree: None,
            open: Vec::new(),
            clock: Box::new(MonotonicClock),
            sink: Arc::new(TracingSink::default()),
        }
    }

    pub fn with_clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_boxed_clock(mut self, clock: Box<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// True when no phase is open
    pub fn is_idle(&self) -> bool {
        self.open.is_empty()
    }

    /// Number of currently open phases
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Open a phase nested inside the innermost open one.
    ///
    /// # Panics
    ///
    /// Panics if `phase_name` is empty.
    pub fn start(&mut self, phase_name: &str) {
        assert!(!phase_name.is_empty(), "Phase name cannot be empty");

        let now = self.clock.now();
        let id = if let (Some(tree), Some(&parent)) = (self.tree.as_mut(), self.open.last()) {
            tree.push_child(parent, phase_name, now)
        } else {
            self.tree = Some(PhaseTree::new(phase_name, now));
            PhaseId::ROOT
        };
        self.open.push(id);
    }

    /// Close the innermost open phase.
    ///
    /// Does nothing when no phase is open. Returns the report when this
    /// closes the outermost phase.
    pub fn end(&mut self) -> Option<PhaseReport> {
        let id = self.open.pop()?;
        let now = self.clock.now();
        let tree = self.tree.as_mut()?;
        tree.close(id, now);

        if id != PhaseId::ROOT {
            return None;
        }

        let tree = self.tree.take()?;
        let report = ReportFormatter::format(&tree, &self.function_name);
        self.sink.emit(&report);
        Some(report)
    }

    /// Run `f` inside a phase named `phase_name`.
    ///
    /// `f` receives the timer so it can open nested phases of its own.
    pub fn time<T>(&mut self, phase_name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.start(phase_name);
        let output = f(self);
        self.end();
        output
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        if !self.open.is_empty() {
            tracing::debug!(
                function = %self.function_name,
                open_phases = self.open.len(),
                "discarding unfinished compilation phase timings"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::clock::SteppingClock;
    use crate::profiler::sink::MemorySink;
    use std::time::Duration;

    fn timer_with_sink(name: &str) -> (PhaseTimer, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let timer = PhaseTimer::new(name)
            .with_clock(SteppingClock::new(Duration::from_millis(20)))
            .with_sink(sink.clone());
        (timer, sink)
    }

    #[test]
    fn test_golden_scenario() {
        let (mut timer, sink) = timer_with_sink("__main__:foo");

        timer.start("Overall compilation");
        timer.start("Subphase 1");
        timer.start("Subsubphase 1");
        assert!(timer.end().is_none());
        assert!(timer.end().is_none());
        timer.start("Subphase 2");
        assert!(timer.end().is_none());
        let report = timer.end().unwrap();

        let expected = concat!(
            "Phase                Time/µs       Leaf/%     Sub Phase/%     Unattributed Time/µs|%\n",
            ">Overall compilation 140000                   100.0           60000 | 42.9\n",
            " >Subphase 1         60000                     75.0           40000 | 66.7\n",
            "  >Subsubphase 1     20000         50.0       100.0\n",
            " >Subphase 2         20000         50.0        25.0\n",
        );
        assert_eq!(report.render_table(), expected);
        assert_eq!(report.function_name, "__main__:foo");

        let emitted = sink.reports();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0], report);
        assert!(timer.is_idle());
    }

    #[test]
    fn test_end_on_idle_timer_is_noop() {
        let (mut timer, sink) = timer_with_sink("__main__:foo");
        assert!(timer.end().is_none());
        assert!(timer.end().is_none());
        assert!(timer.is_idle());
        assert!(sink.is_empty());

        // still usable afterwards
        timer.start("Overall compilation");
        assert!(timer.end().is_some());
        assert!(timer.end().is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    #[should_panic(expected = "Phase name cannot be empty")]
    fn test_empty_phase_name_panics() {
        let mut timer = PhaseTimer::new("__main__:foo");
        timer.start("");
    }

    #[test]
    fn test_depth_tracking() {
        let (mut timer, _sink) = timer_with_sink("m:f");
        timer.start("a");
        timer.start("b");
        timer.start("c");
        assert_eq!(timer.depth(), 3);
        timer.end();
        assert_eq!(timer.depth(), 2);
        timer.start("d");
        assert_eq!(timer.depth(), 3);
    }

    #[test]
    fn test_sessions_do_not_accumulate() {
        let (mut timer, sink) = timer_with_sink("m:f");

        timer.start("first");
        timer.start("inner");
        timer.end();
        let first = timer.end().unwrap();
        assert_eq!(first.rows.len(), 2);

        timer.start("second");
        let second = timer.end().unwrap();
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].name, "second");
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_time_closure_nests() {
        let (mut timer, _sink) = timer_with_sink("m:f");

        timer.start("Overall compilation");
        let value = timer.time("HIR transformations", |timer| {
            timer.time("SSAify", |_| ());
            timer.time("Simplify", |_| 42)
        });
        assert_eq!(value, 42);
        let report = timer.end().unwrap();

        let names: Vec<_> = report
            .rows
            .iter()
            .map(|row| (row.depth, row.name.as_str()))
            .collect();
        assert_eq!(
            names,
            [
                (0, "Overall compilation"),
                (1, "HIR transformations"),
                (2, "SSAify"),
                (2, "Simplify"),
            ]
        );
    }

    #[test]
    fn test_dropping_open_timer_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        {
            let mut timer = PhaseTimer::new("m:f").with_sink(sink.clone());
            timer.start("Overall compilation");
            timer.start("Lowering into HIR");
        }
        assert!(sink.is_empty());
    }
}
