//! # Result reporting.
//!
//! Turns a sorted [`ResultList`] into report rows and a process outcome:
//!
//! ```text
//! STATUS   CODE    NAME           DESCRIPTION            FAILURE MESSAGE
//! Success  AM0001  default_chan…  …                      None
//! Failed   AM0003  operator_name  …                      csv.name "x" is not …
//! Failed   AM0003  operator_name  …                      csv.replaces "y" is not …
//! Error    AM0007  csv_perms      …                      execution failed: …
//! ```
//!
//! Errors outrank failures when deriving the [`RunOutcome`].

use std::fmt;

use crate::validator::{ResultList, Status, ValidationResult};

/// Column headers of the rendered table.
pub const HEADERS: [&str; 5] = ["STATUS", "CODE", "NAME", "DESCRIPTION", "FAILURE MESSAGE"];

/// One line of the report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub status: &'static str,
    pub code: String,
    pub name: String,
    pub description: String,
    /// Failure message, error text, or `None` for a success.
    pub message: String,
}

impl ReportRow {
    fn cells(&self) -> [&str; 5] {
        [
            self.status,
            &self.code,
            &self.name,
            &self.description,
            &self.message,
        ]
    }
}

/// Aggregate verdict of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every validator succeeded.
    Passed,
    /// At least one failure and no error.
    Failed,
    /// At least one validator could not reach a verdict.
    Errored,
}

impl RunOutcome {
    /// Process exit code: 0, 1 or 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::Failed => 1,
            RunOutcome::Errored => 2,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            RunOutcome::Passed => "passed",
            RunOutcome::Failed => "failed",
            RunOutcome::Errored => "errored",
        }
    }
}

impl ResultList {
    /// One row per failure message, one per success, one per error.
    ///
    /// Rows follow the list order; sort the list first for a stable report.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.iter().flat_map(rows_of).collect()
    }

    pub fn outcome(&self) -> RunOutcome {
        if !self.errors().is_empty() {
            RunOutcome::Errored
        } else if self.has_failure() {
            RunOutcome::Failed
        } else {
            RunOutcome::Passed
        }
    }

    /// Renders the rows as an aligned text table.
    pub fn table(&self) -> Table {
        Table(self.rows())
    }
}

fn rows_of(res: &ValidationResult) -> Vec<ReportRow> {
    let row = |message: String| ReportRow {
        status: res.status_label(),
        code: res.code().to_string(),
        name: res.name().to_string(),
        description: res.description().to_string(),
        message,
    };

    match res.status() {
        Status::Success => vec![row("None".to_string())],
        Status::Error(e) => vec![row(e.to_string())],
        Status::Failure(messages) => messages.iter().map(|m| row(m.clone())).collect(),
    }
}

/// Text table over report rows; see the module docs for the layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table(pub Vec<ReportRow>);

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths = HEADERS.map(str::len);
        for row in &self.0 {
            for (w, cell) in widths.iter_mut().zip(row.cells()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |f: &mut fmt::Formatter<'_>, cells: [&str; 5]| -> fmt::Result {
            let last = cells.len() - 1;
            for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
                if i == last {
                    writeln!(f, "{cell}")?;
                } else {
                    write!(f, "{cell:<w$}  ")?;
                }
            }
            Ok(())
        };

        line(f, HEADERS)?;
        for row in &self.0 {
            line(f, row.cells())?;
        }
        Ok(())
    }
}
