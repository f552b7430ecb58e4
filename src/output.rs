//! Listing Output
//!
//! Query results are printed either as aligned text tables (the default) or as
//! pretty JSON arrays (`--output json`).
//!
//! # Table Layout
//! ```text
//! id | name
//! ---+------------
//! 1  | Engineering
//! (1 row)
//! ```

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Result, StaffdeskError};
use crate::store::{
    Department, DepartmentBudget, DepartmentMember, EmployeeDetail, ManagedEmployee, RoleSummary,
};

/// How listings are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON array
    Json,
}

/// A row that can be printed as a table line
pub trait TableRow {
    /// Column headers, one per cell
    const HEADERS: &'static [&'static str];

    /// Cell values in header order
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Department {
    const HEADERS: &'static [&'static str] = &["id", "name"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl TableRow for RoleSummary {
    const HEADERS: &'static [&'static str] = &["id", "title", "department", "salary"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.title.clone(), self.department.clone(), self.salary.clone()]
    }
}

impl TableRow for EmployeeDetail {
    const HEADERS: &'static [&'static str] =
        &["id", "first_name", "last_name", "title", "manager", "department", "salary"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.title.clone(),
            // absent manager prints as an empty cell, like SQL NULL
            self.manager.clone().unwrap_or_default(),
            self.department.clone(),
            self.salary.clone(),
        ]
    }
}

impl TableRow for DepartmentMember {
    const HEADERS: &'static [&'static str] = &["department", "employee", "title", "manager"];

    fn cells(&self) -> Vec<String> {
        vec![self.department.clone(), self.employee.clone(), self.title.clone(), self.manager.clone()]
    }
}

impl TableRow for ManagedEmployee {
    const HEADERS: &'static [&'static str] = &["manager", "employee", "title", "department"];

    fn cells(&self) -> Vec<String> {
        vec![self.manager.clone(), self.employee.clone(), self.title.clone(), self.department.clone()]
    }
}

impl TableRow for DepartmentBudget {
    const HEADERS: &'static [&'static str] = &["department", "total_salary"];

    fn cells(&self) -> Vec<String> {
        vec![self.department.clone(), self.total_salary.clone()]
    }
}

/// Render rows in the requested format
pub fn render<T>(rows: &[T], format: OutputFormat) -> Result<String>
where
    T: TableRow + Serialize,
{
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => serde_json::to_string_pretty(rows).map_err(|e| {
            StaffdeskError::output_failed(format!("Could not serialize rows as JSON: {e}"))
        }),
    }
}

/// Render rows as an aligned text table followed by a row count
#[must_use]
pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();

    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let headers: Vec<String> = T::HEADERS.iter().map(|h| (*h).to_string()).collect();
    push_line(&mut out, &headers, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in &cells {
        push_line(&mut out, row, &widths);
    }

    match rows.len() {
        1 => out.push_str("(1 row)\n"),
        n => out.push_str(&format!("({n} rows)\n")),
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
