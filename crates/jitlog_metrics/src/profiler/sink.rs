use jitlog_config::ReportFormat;
use parking_lot::Mutex;

use super::report::PhaseReport;

/// Destination for finished phase reports
pub trait ReportSink: Send + Sync {
    fn emit(&self, report: &PhaseReport);
}

/// Logs reports through `tracing` under the `jitlog::phase_times` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    format: ReportFormat,
}

impl TracingSink {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }
}

impl ReportSink for TracingSink {
    fn emit(&self, report: &PhaseReport) {
        match self.format {
            ReportFormat::Table => {
                tracing::info!(
                    target: "jitlog::phase_times",
                    function = %report.function_name,
                    "{}\n{}",
                    report.title(),
                    report.render_table()
                );
            }
            ReportFormat::Json => match report.to_json() {
                Ok(json) => {
                    tracing::info!(
                        target: "jitlog::phase_times",
                        function = %report.function_name,
                        "{json}"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        target: "jitlog::phase_times",
                        function = %report.function_name,
                        error = %err,
                        "failed to serialize phase report"
                    );
                }
            },
        }
    }
}

/// Keeps every report in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<PhaseReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<PhaseReport> {
        self.reports.lock().clone()
    }

    pub fn take(&self) -> Vec<PhaseReport> {
        std::mem::take(&mut *self.reports.lock())
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &PhaseReport) {
        self.reports.lock().push(report.clone());
    }
}
