//! Terminal UI utilities.
//!
//! A box-drawn table sized to its content, used for the target listing and
//! the end-of-build summary. Cell widths are measured with
//! `console::measure_text_width`, so colored cells still line up.
//!
//! ```rust,no_run
//! use buildmatrix::ui::Table;
//!
//! let mut table = Table::new(&["Target", "Status"]);
//! table.add_row(vec!["desktop".to_string(), "done".to_string()]);
//! table.print();
//! ```

use crate::build::{MatrixReport, TargetState};
use colored::*;
use console::measure_text_width;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(measure_text_width(cell));
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.column_widths();

        let border = |left: &str, mid: &str, right: &str| -> String {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| -> String {
            let mut out = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let padding = width.saturating_sub(measure_text_width(cell));
                let shown = if bold {
                    cell.bold().to_string()
                } else {
                    cell.clone()
                };
                out.push_str(&format!(" {}{} │", shown, " ".repeat(padding)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers[..], true)];
        lines.push(border("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(line(&row[..], false));
        }
        lines.push(border("└", "┴", "┘"));
        lines.join("\n")
    }

    pub fn print(&self) {
        if !self.headers.is_empty() {
            println!("{}", self.render());
        }
    }
}

/// Per-target result table printed after a build
pub fn summary_table(report: &MatrixReport) -> Table {
    let mut table = Table::new(&["Target", "Status", "Time", "Details"]);
    for outcome in &report.outcomes {
        let status = match outcome.state {
            TargetState::Done => "done".green().to_string(),
            TargetState::Failed => "failed".red().to_string(),
            other => other.to_string().dimmed().to_string(),
        };
        let details = match &outcome.error {
            Some(e) => format!("{}: {}", e.stage(), e.error),
            None if outcome.state == TargetState::Done => outcome
                .executables
                .iter()
                .map(|exe| exe.path.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            None => "skipped".to_string(),
        };
        table.add_row(vec![
            outcome.target.clone(),
            status,
            format!("{:.2?}", outcome.elapsed),
            details,
        ]);
    }
    table
}
