//! Query Layer
//!
//! This module defines the row types and the [`StaffStore`] trait: one async
//! method per SQL statement against the `department`, `role` and `employee`
//! tables. [`postgres::PostgresStore`] is the production implementation.
//!
//! # Stateless Design
//! Every method is a single request/response round-trip. Nothing is cached and
//! no method opens a transaction, so every write is one atomic statement.
//!
//! # Deletes
//! The `remove_*` methods delete unconditionally. Callers go through
//! [`integrity`], which runs the dependent-row count first.

use serde::Serialize;
use std::future::Future;

use crate::error::Result;

pub mod integrity;
pub mod postgres;

/// Surrogate key type of all three tables (`SERIAL`)
pub type RowId = i32;

/// Label shown wherever an employee has no manager
pub const NO_MANAGER_LABEL: &str = "No Manager";

/// A department row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    pub id: RowId,
    pub name: String,
}

/// A role joined with its department name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleSummary {
    pub id: RowId,
    pub title: String,
    pub department: String,
    /// Decimal rendered by the database (`NUMERIC::text`)
    pub salary: String,
}

/// An employee id with a composite label for selection prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub id: RowId,
    pub label: String,
}

impl EmployeeSummary {
    /// Build the `"<first> <last> - <title> - Dept - <department>"` label
    #[must_use]
    pub fn compose_label(first_name: &str, last_name: &str, title: &str, department: &str) -> String {
        format!("{first_name} {last_name} - {title} - Dept - {department}")
    }
}

/// Full employee record for the "View All Employees" listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeDetail {
    pub id: RowId,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    /// Manager's full name, `None` when `manager_id` is NULL
    pub manager: Option<String>,
    pub department: String,
    pub salary: String,
}

/// Employees grouped by department
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentMember {
    pub department: String,
    pub employee: String,
    pub title: String,
    pub manager: String,
}

/// Employees grouped by manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedEmployee {
    pub manager: String,
    pub employee: String,
    pub title: String,
    pub department: String,
}

/// Summed salaries of every employee in a department's roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentBudget {
    pub department: String,
    pub total_salary: String,
}

/// Insert parameters for the `employee` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: RowId,
    pub manager_id: Option<RowId>,
}

/// Resolve a nullable manager name to its display label
#[must_use]
pub fn manager_label(manager: Option<String>) -> String {
    manager.unwrap_or_else(|| NO_MANAGER_LABEL.to_string())
}

/// Normalize a dependent count read from the database
///
/// No row, a NULL count, or a negative value all mean "no dependents".
#[must_use]
pub fn normalize_count(count: Option<i64>) -> u64 {
    count.and_then(|n| u64::try_from(n).ok()).unwrap_or(0)
}

/// Data store operations
///
/// Write methods return the number of rows affected.
pub trait StaffStore {
    /// Departments ordered by name
    fn list_departments(&self) -> impl Future<Output = Result<Vec<Department>>> + Send;

    /// Roles with their department, ordered by title
    ///
    /// Roles whose department no longer exists are excluded.
    fn list_roles(&self) -> impl Future<Output = Result<Vec<RoleSummary>>> + Send;

    /// Employee labels ordered by department, surname, first name
    fn list_employee_summaries(&self) -> impl Future<Output = Result<Vec<EmployeeSummary>>> + Send;

    /// Employee records with resolved manager names
    fn list_employee_details(&self) -> impl Future<Output = Result<Vec<EmployeeDetail>>> + Send;

    fn list_employees_by_department(
        &self,
    ) -> impl Future<Output = Result<Vec<DepartmentMember>>> + Send;

    fn list_employees_by_manager(&self)
        -> impl Future<Output = Result<Vec<ManagedEmployee>>> + Send;

    /// Total salary for a department, `None` when it has no employees
    fn total_utilized_budget(
        &self,
        department_id: RowId,
    ) -> impl Future<Output = Result<Option<DepartmentBudget>>> + Send;

    fn insert_department(&self, name: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Insert a role; `salary` is parsed by the database
    fn insert_role(
        &self,
        title: &str,
        salary: &str,
        department_id: RowId,
    ) -> impl Future<Output = Result<u64>> + Send;

    fn insert_employee(&self, employee: &NewEmployee) -> impl Future<Output = Result<u64>> + Send;

    fn update_employee_role(
        &self,
        employee_id: RowId,
        role_id: RowId,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Set or clear (`None`) an employee's manager
    fn update_employee_manager(
        &self,
        employee_id: RowId,
        manager_id: Option<RowId>,
    ) -> impl Future<Output = Result<u64>> + Send;

    fn count_roles_referencing_department(
        &self,
        department_id: RowId,
    ) -> impl Future<Output = Result<u64>> + Send;

    fn count_employees_referencing_role(
        &self,
        role_id: RowId,
    ) -> impl Future<Output = Result<u64>> + Send;

    fn count_employees_managed_by(
        &self,
        employee_id: RowId,
    ) -> impl Future<Output = Result<u64>> + Send;

    fn remove_department(&self, department_id: RowId) -> impl Future<Output = Result<u64>> + Send;

    fn remove_role(&self, role_id: RowId) -> impl Future<Output = Result<u64>> + Send;

    fn remove_employee(&self, employee_id: RowId) -> impl Future<Output = Result<u64>> + Send;
}
