//! Guarded deletes
//!
//! Each delete counts dependent rows first and only issues the `DELETE` when
//! the count is zero. The check and the delete are two statements; there is
//! no transaction around them.

use std::fmt;

use tracing::{debug, info};

use crate::error::Result;
use crate::store::{RowId, StaffStore};

/// Relationship that keeps a row from being deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// Roles still belong to the department
    RolesInDepartment,
    /// Employees still hold the role
    EmployeesInRole,
    /// Employees still report to the employee
    DirectReports,
}

/// Refusal to delete, with the number of dependent rows found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocker {
    pub dependency: Dependency,
    pub dependents: u64,
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.dependents;
        match self.dependency {
            Dependency::RolesInDepartment => write!(
                f,
                "Cannot delete this department: {n} role(s) still belong to it. Delete or move those roles first."
            ),
            Dependency::EmployeesInRole => write!(
                f,
                "Cannot delete this role: {n} employee(s) still hold it. Reassign those employees first."
            ),
            Dependency::DirectReports => write!(
                f,
                "Cannot delete this employee: {n} employee(s) still report to them. Update their manager first."
            ),
        }
    }
}

/// Result of a guarded delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The delete ran; number of rows removed
    Deleted(u64),
    /// Dependents exist, nothing was deleted
    Blocked(Blocker),
}

impl DeleteOutcome {
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

fn guard(dependency: Dependency, dependents: u64) -> Option<DeleteOutcome> {
    (dependents > 0).then_some(DeleteOutcome::Blocked(Blocker { dependency, dependents }))
}

/// Delete a department unless a role references it
pub async fn delete_department<S: StaffStore>(store: &S, department_id: RowId) -> Result<DeleteOutcome> {
    let dependents = store.count_roles_referencing_department(department_id).await?;
    if let Some(blocked) = guard(Dependency::RolesInDepartment, dependents) {
        debug!(department_id, dependents, "department delete blocked");
        return Ok(blocked);
    }

    let removed = store.remove_department(department_id).await?;
    info!(department_id, removed, "department deleted");
    Ok(DeleteOutcome::Deleted(removed))
}

/// Delete a role unless an employee holds it
pub async fn delete_role<S: StaffStore>(store: &S, role_id: RowId) -> Result<DeleteOutcome> {
    let dependents = store.count_employees_referencing_role(role_id).await?;
    if let Some(blocked) = guard(Dependency::EmployeesInRole, dependents) {
        debug!(role_id, dependents, "role delete blocked");
        return Ok(blocked);
    }

    let removed = store.remove_role(role_id).await?;
    info!(role_id, removed, "role deleted");
    Ok(DeleteOutcome::Deleted(removed))
}

/// Delete an employee unless someone reports to them
pub async fn delete_employee<S: StaffStore>(store: &S, employee_id: RowId) -> Result<DeleteOutcome> {
    let dependents = store.count_employees_managed_by(employee_id).await?;
    if let Some(blocked) = guard(Dependency::DirectReports, dependents) {
        debug!(employee_id, dependents, "employee delete blocked");
        return Ok(blocked);
    }

    let removed = store.remove_employee(employee_id).await?;
    info!(employee_id, removed, "employee deleted");
    Ok(DeleteOutcome::Deleted(removed))
}
