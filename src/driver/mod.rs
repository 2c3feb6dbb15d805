//! Compilation driver
//!
//! Asks the [`FunctionSelector`] whether a function wants a timing
//! breakdown and, if so, brackets every compilation stage with phase timer
//! calls:
//!
//! ```text
//! Overall compilation
//!   Lowering into HIR
//!   HIR transformations
//!     <one phase per HIR pass>
//!   Native code Generation
//! ```
//!
//! Unselected functions compile with no timer at all.

pub mod synthetic;

use std::sync::Arc;

use anyhow::{Context, Result};
use jitlog_config::TimeLogConfig;
use jitlog_metrics::{
    FunctionSelector, MonotonicClock, PhaseReport, PhaseTimer, ReportSink, TimeSource, TracingSink,
};
use rayon::prelude::*;

pub use synthetic::SyntheticPipeline;

pub const OVERALL_PHASE: &str = "Overall compilation";
pub const LOWERING_PHASE: &str = "Lowering into HIR";
pub const HIR_PASSES_PHASE: &str = "HIR transformations";
pub const CODEGEN_PHASE: &str = "Native code Generation";

/// The compiler stages the driver runs for one function
pub trait Pipeline: Send {
    /// Build HIR from the function's bytecode
    fn lower(&mut self) -> Result<()>;

    fn pass_count(&self) -> usize;

    fn pass_name(&self, index: usize) -> &str;

    fn run_pass(&mut self, index: usize) -> Result<()>;

    /// Emit machine code, returning its size in bytes
    fn generate_code(&mut self) -> Result<usize>;
}

/// Result of compiling one function
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    pub qualified_name: String,
    pub code_size: usize,
    /// Present only when the function was selected for timing
    pub report: Option<PhaseReport>,
}

/// One entry of a batch compilation
pub struct CompileJob {
    pub qualified_name: String,
    pub pipeline: Box<dyn Pipeline>,
}

impl CompileJob {
    pub fn new(qualified_name: impl Into<String>, pipeline: impl Pipeline + 'static) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            pipeline: Box::new(pipeline),
        }
    }
}

/// Creates the time source for each timed compilation
pub type ClockFactory = Arc<dyn Fn() -> Box<dyn TimeSource> + Send + Sync>;

/// Compiles functions, timing the ones the selector opts in
pub struct CompilationDriver {
    selector: Arc<FunctionSelector>,
    clock: ClockFactory,
    sink: Arc<dyn ReportSink>,
}

impl CompilationDriver {
    pub fn new(selector: Arc<FunctionSelector>) -> Self {
        Self {
            selector,
            clock: Arc::new(|| Box::new(MonotonicClock) as Box<dyn TimeSource>),
            sink: Arc::new(TracingSink::default()),
        }
    }

    pub fn from_config(config: &TimeLogConfig) -> Self {
        let selector = Arc::new(FunctionSelector::from_list(
            &config.capture_compilation_times_for,
        ));
        Self::new(selector).with_sink(Arc::new(TracingSink::new(config.report_format)))
    }

    /// Use a different time source; called once per timed compilation
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> Box<dyn TimeSource> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn selector(&self) -> &FunctionSelector {
        &self.selector
    }

    /// Replace the selector list; compilations already running keep their
    /// timers
    pub fn reconfigure(&self, raw_list: &str) {
        self.selector.configure(raw_list);
    }

    fn timer_for(&self, qualified_name: &str) -> Option<PhaseTimer> {
        self.selector.is_selected(qualified_name).then(|| {
            PhaseTimer::new(qualified_name)
                .with_boxed_clock((self.clock)())
                .with_sink(Arc::clone(&self.sink))
        })
    }

    /// Compile one function.
    ///
    /// A failing stage aborts the compilation; its partial timings are
    /// dropped without a report.
    pub fn compile(
        &self,
        qualified_name: &str,
        pipeline: &mut dyn Pipeline,
    ) -> Result<CompiledFunction> {
        tracing::debug!(function = qualified_name, "compiling");

        let mut timer = self.timer_for(qualified_name);
        if let Some(timer) = timer.as_mut() {
            timer.start(OVERALL_PHASE);
        }

        timed(&mut timer, LOWERING_PHASE, |_| pipeline.lower())
            .with_context(|| format!("lowering {qualified_name} into HIR failed"))?;

        timed(&mut timer, HIR_PASSES_PHASE, |timer| -> Result<()> {
            for index in 0..pipeline.pass_count() {
                let pass_name = pipeline.pass_name(index).to_string();
                timed(timer, &pass_name, |_| pipeline.run_pass(index))
                    .with_context(|| format!("pass {pass_name} failed on {qualified_name}"))?;
            }
            Ok(())
        })?;

        let code_size = timed(&mut timer, CODEGEN_PHASE, |_| pipeline.generate_code())
            .with_context(|| format!("generating native code for {qualified_name} failed"))?;

        let report = timer.as_mut().and_then(PhaseTimer::end);
        tracing::debug!(function = qualified_name, code_size, "finished compiling");

        Ok(CompiledFunction {
            qualified_name: qualified_name.to_string(),
            code_size,
            report,
        })
    }

    /// Compile every job on the rayon pool.
    ///
    /// Each worker owns the timer of the function it is compiling; only the
    /// selector is shared. Results keep the order of `jobs`.
    pub fn compile_batch(&self, jobs: &mut [CompileJob]) -> Vec<Result<CompiledFunction>> {
        jobs.par_iter_mut()
            .map(|job| self.compile(&job.qualified_name, job.pipeline.as_mut()))
            .collect()
    }
}

/// Run `f` inside a phase when timing is active, or just run it otherwise
pub fn timed<T>(
    timer: &mut Option<PhaseTimer>,
    phase_name: &str,
    f: impl FnOnce(&mut Option<PhaseTimer>) -> T,
) -> T {
    if let Some(timer) = timer.as_mut() {
        timer.start(phase_name);
    }
    let output = f(timer);
    if let Some(timer) = timer.as_mut() {
        timer.end();
    }
    output
}
