use anyhow::{Result, bail};

use super::Pipeline;

/// Stage at which a [`SyntheticPipeline`] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lowering,
    Pass(usize),
    Codegen,
}

/// Stand-in pipeline that runs named passes without doing real work.
///
/// Used by the `demo` command and in tests to exercise the driver protocol.
#[derive(Debug, Clone)]
pub struct SyntheticPipeline {
    passes: Vec<String>,
    passes_run: Vec<String>,
    lowered: bool,
    bytes_per_pass: usize,
    fail_at: Option<Stage>,
}

impl SyntheticPipeline {
    pub fn new<I, S>(passes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passes: passes.into_iter().map(Into::into).collect(),
            passes_run: Vec::new(),
            lowered: false,
            bytes_per_pass: 64,
            fail_at: None,
        }
    }

    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Names of the passes that ran during the last compilation
    pub fn passes_run(&self) -> &[String] {
        &self.passes_run
    }
}

impl Pipeline for SyntheticPipeline {
    fn lower(&mut self) -> Result<()> {
        if self.fail_at == Some(Stage::Lowering) {
            bail!("unsupported bytecode");
        }
        self.passes_run.clear();
        self.lowered = true;
        Ok(())
    }

    fn pass_count(&self) -> usize {
        self.passes.len()
    }

    fn pass_name(&self, index: usize) -> &str {
        &self.passes[index]
    }

    fn run_pass(&mut self, index: usize) -> Result<()> {
        if !self.lowered {
            bail!("pass run before lowering");
        }
        if self.fail_at == Some(Stage::Pass(index)) {
            bail!("verification failed after {}", self.passes[index]);
        }
        self.passes_run.push(self.passes[index].clone());
        Ok(())
    }

    fn generate_code(&mut self) -> Result<usize> {
        if self.fail_at == Some(Stage::Codegen) {
            bail!("register allocation failed");
        }
        self.lowered = false;
        Ok(self.bytes_per_pass * (self.passes_run.len() + 1))
    }
}
