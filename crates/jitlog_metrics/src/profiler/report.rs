//! Phase time breakdown reports
//!
//! A finished [`PhaseTree`] is flattened depth-first into one row per phase.
//! Each row carries three percentages measured against different bases:
//!
//! - leaf %: share of the summed time of all leaf phases (leaf rows only)
//! - sub phase %: share of the summed time of the row's sibling group,
//!   the row itself included (`100.0` for the root)
//! - unattributed %: share of the row's own time not covered by any of its
//!   sub-phases (non-leaf rows only)
//!
//! Large unattributed time means part of a phase is not instrumented.

use serde::Serialize;
use std::fmt;

use super::tree::{PhaseId, PhaseTree};

/// One flattened phase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub depth: usize,
    pub name: String,
    pub duration_us: u64,
    pub is_leaf: bool,
    pub unattributed_us: u64,
    pub leaf_percent: Option<f64>,
    pub sub_phase_percent: f64,
    pub unattributed_percent: Option<f64>,
}

/// Time breakdown for a single compiled function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub function_name: String,
    pub rows: Vec<ReportRow>,
}

impl PhaseReport {
    /// Title line naming the compiled function
    pub fn title(&self) -> String {
        format!(
            "Compilation phase time breakdown for {}",
            self.function_name
        )
    }

    /// The aligned table: one header line followed by one line per phase
    pub fn render_table(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn root(&self) -> Option<&ReportRow> {
        self.rows.first()
    }

    pub fn row(&self, name: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.name == name)
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let longest = self
            .rows
            .iter()
            .map(|row| row.name.chars().count() + 1 + row.depth)
            .max()
            .unwrap_or(0);
        let duration_digits = self
            .rows
            .iter()
            .map(|row| digits(row.duration_us))
            .max()
            .unwrap_or(0);
        let unattributed_digits = self
            .rows
            .iter()
            .map(|row| digits(row.unattributed_us))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "Phase{}Time/µs{}Leaf/%     Sub Phase/%     Unattributed Time/µs|%",
            " ".repeat(longest.saturating_sub(4)),
            " ".repeat(duration_digits + 1),
        )?;

        for row in &self.rows {
            let label = format!("{}>{}", " ".repeat(row.depth), row.name);
            write!(f, "{label:<longest$}")?;
            write!(
                f,
                " {:<width$}",
                row.duration_us,
                width = duration_digits + 7
            )?;

            match row.leaf_percent {
                Some(percent) => write!(f, "{percent:>5.1} ")?,
                None => f.write_str("      ")?,
            }
            f.write_str("      ")?;
            write!(f, "{:>5.1}", row.sub_phase_percent)?;

            if let Some(percent) = row.unattributed_percent {
                write!(
                    f,
                    "           {:<width$} |{percent:>5.1}",
                    row.unattributed_us,
                    width = unattributed_digits
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Turns a completed phase tree into a [`PhaseReport`]
pub struct ReportFormatter;

impl ReportFormatter {
    /// Flatten `tree` and compute per-phase statistics.
    ///
    /// Pure: formatting the same tree twice yields equal reports.
    pub fn format(tree: &PhaseTree, function_name: &str) -> PhaseReport {
        let order = tree.preorder();

        // sibling group totals, indexed by phase id
        let mut group_totals = vec![0u64; tree.len()];
        group_totals[PhaseId::ROOT.index()] = tree.duration_us(PhaseId::ROOT);
        for &(_, id) in &order {
            let total = tree.children_total_us(id);
            for &child in tree.children(id) {
                group_totals[child.index()] = total;
            }
        }

        let leaf_total: u64 = order
            .iter()
            .filter(|&&(_, id)| tree.node(id).is_leaf())
            .map(|&(_, id)| tree.duration_us(id))
            .fold(0, u64::saturating_add);

        let rows = order
            .into_iter()
            .map(|(depth, id)| {
                let node = tree.node(id);
                let duration_us = tree.duration_us(id);
                let is_leaf = node.is_leaf();
                let unattributed_us = duration_us.saturating_sub(tree.children_total_us(id));

                let sub_phase_percent = if id == PhaseId::ROOT {
                    100.0
                } else {
                    percent(duration_us, group_totals[id.index()])
                };

                ReportRow {
                    depth,
                    name: node.name.clone(),
                    duration_us,
                    is_leaf,
                    unattributed_us,
                    leaf_percent: is_leaf.then(|| percent(duration_us, leaf_total)),
                    sub_phase_percent,
                    unattributed_percent: (!is_leaf).then(|| percent(unattributed_us, duration_us)),
                }
            })
            .collect();

        PhaseReport {
            function_name: function_name.to_string(),
            rows,
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Decimal digit count, with zero taking no width
fn digits(value: u64) -> usize {
    if value == 0 {
        0
    } else {
        value.ilog10() as usize + 1
    }
}
