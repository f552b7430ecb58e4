//! staffdesk - Interactive Staff Directory CLI
//!
//! staffdesk manages departments, roles and employees stored in PostgreSQL
//! through a single interactive menu.
//!
//! # Core Principles
//! - One statement per operation, every user value a bound parameter
//! - Deletes are refused while dependent rows still reference the target
//! - "No manager" is a tagged choice that becomes SQL `NULL`
//! - A failed action never ends the session; only "Exit" does
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`config`] - Connection settings from the environment and `.env` files
//! - [`store`] - Query layer: row types, the [`StaffStore`] trait, PostgreSQL backend, guarded deletes
//! - [`prompt`] - Selection prompts mapping labels to row ids
//! - [`menu`] - The command dispatcher loop
//! - [`output`] - Table and JSON rendering of listings

pub mod config;
pub mod error;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod store;

// Re-export commonly used types for convenience
pub use config::ConnectionSettings;
pub use error::{Result, StaffdeskError};
pub use menu::{Dispatcher, Flow, MenuAction};
pub use output::OutputFormat;
pub use prompt::{Choice, ManagerChoice, Prompter, TerminalPrompter};
pub use store::integrity::{Blocker, DeleteOutcome, Dependency};
pub use store::postgres::PostgresStore;
pub use store::{
    Department, DepartmentBudget, DepartmentMember, EmployeeDetail, EmployeeSummary,
    ManagedEmployee, NewEmployee, RoleSummary, RowId, StaffStore, NO_MANAGER_LABEL,
};
