//! `PostgreSQL` implementation of [`StaffStore`]
//!
//! # Implementation Notes
//! - Uses `tokio-postgres`; one client is opened at startup and reused for every statement
//! - The driver's connection future runs on a spawned task until the client is dropped
//! - Every user-supplied value is a bound parameter (`$1`, `$2`, ...)
//! - `NUMERIC` salaries are read as `::text` and written through `$n::text::numeric`,
//!   so a non-numeric salary is rejected by the server
//! - `COUNT(*)` results are read as nullable and normalized to zero

use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, ToSql};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info, warn};

use crate::config::ConnectionSettings;
use crate::error::{Result, StaffdeskError};
use crate::store::{
    manager_label, normalize_count, Department, DepartmentBudget, DepartmentMember,
    EmployeeDetail, EmployeeSummary, ManagedEmployee, NewEmployee, RoleSummary, RowId,
    StaffStore,
};

const LIST_DEPARTMENTS: &str = "SELECT id, name FROM department ORDER BY name";

const LIST_ROLES: &str = "
    SELECT r.id, r.title, d.name AS department, r.salary::text AS salary
    FROM role r
    INNER JOIN department d ON r.department_id = d.id
    ORDER BY r.title";

const LIST_EMPLOYEE_SUMMARIES: &str = "
    SELECT e.id, e.first_name, e.last_name, r.title, d.name AS department
    FROM employee e
    INNER JOIN role r ON e.role_id = r.id
    INNER JOIN department d ON d.id = r.department_id
    ORDER BY d.name, e.last_name, e.first_name";

const LIST_EMPLOYEE_DETAILS: &str = "
    SELECT e.id, e.first_name, e.last_name, r.title,
           m.first_name || ' ' || m.last_name AS manager,
           d.name AS department, r.salary::text AS salary
    FROM employee e
    INNER JOIN role r ON e.role_id = r.id
    INNER JOIN department d ON d.id = r.department_id
    LEFT OUTER JOIN employee m ON e.manager_id = m.id
    ORDER BY e.id";

const LIST_EMPLOYEES_BY_DEPARTMENT: &str = "
    SELECT d.name AS department,
           e.first_name || ' ' || e.last_name AS employee,
           r.title,
           m.first_name || ' ' || m.last_name AS manager
    FROM employee e
    INNER JOIN role r ON e.role_id = r.id
    INNER JOIN department d ON d.id = r.department_id
    LEFT OUTER JOIN employee m ON e.manager_id = m.id
    ORDER BY d.name, e.last_name, e.first_name";

const LIST_EMPLOYEES_BY_MANAGER: &str = "
    SELECT m.first_name || ' ' || m.last_name AS manager,
           e.first_name || ' ' || e.last_name AS employee,
           r.title,
           d.name AS department
    FROM employee e
    INNER JOIN role r ON e.role_id = r.id
    INNER JOIN department d ON d.id = r.department_id
    LEFT OUTER JOIN employee m ON e.manager_id = m.id
    ORDER BY manager NULLS FIRST, e.last_name, e.first_name";

// Grouped aggregate: no employees means no row at all, never a NULL sum
const TOTAL_UTILIZED_BUDGET: &str = "
    SELECT d.name AS department, SUM(r.salary)::text AS total_salary
    FROM employee e
    INNER JOIN role r ON e.role_id = r.id
    INNER JOIN department d ON d.id = r.department_id
    WHERE d.id = $1
    GROUP BY d.name";

const INSERT_DEPARTMENT: &str = "INSERT INTO department (name) VALUES ($1)";

const INSERT_ROLE: &str =
    "INSERT INTO role (title, salary, department_id) VALUES ($1, $2::text::numeric, $3)";

const INSERT_EMPLOYEE: &str =
    "INSERT INTO employee (first_name, last_name, role_id, manager_id) VALUES ($1, $2, $3, $4)";

const UPDATE_EMPLOYEE_ROLE: &str = "UPDATE employee SET role_id = $1 WHERE id = $2";

const UPDATE_EMPLOYEE_MANAGER: &str = "UPDATE employee SET manager_id = $1 WHERE id = $2";

const COUNT_ROLES_IN_DEPARTMENT: &str = "SELECT COUNT(*) FROM role WHERE department_id = $1";

const COUNT_EMPLOYEES_IN_ROLE: &str = "SELECT COUNT(*) FROM employee WHERE role_id = $1";

const COUNT_DIRECT_REPORTS: &str = "SELECT COUNT(*) FROM employee WHERE manager_id = $1";

const DELETE_DEPARTMENT: &str = "DELETE FROM department WHERE id = $1";

const DELETE_ROLE: &str = "DELETE FROM role WHERE id = $1";

const DELETE_EMPLOYEE: &str = "DELETE FROM employee WHERE id = $1";

/// Database and user the session is connected as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub database: String,
    pub user: String,
}

/// `PostgreSQL` store owning the process-wide connection
pub struct PostgresStore {
    client: Client,
    connection_task: JoinHandle<()>,
}

impl PostgresStore {
    /// Open the connection
    ///
    /// Must be called inside a tokio runtime; the connection is driven by a spawned task.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let pg_config = settings.to_pg_config();

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            StaffdeskError::connection_failed(format!(
                "Failed to connect to PostgreSQL at {}:{}: {e}",
                settings.host, settings.port
            ))
        })?;

        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection closed with an error");
            }
        });

        info!(host = %settings.host, port = settings.port, database = %settings.database, "connected");
        Ok(Self { client, connection_task })
    }

    /// Report the database and user of the current session
    pub async fn session_info(&self) -> Result<SessionInfo> {
        let row = self
            .client
            .query_one("SELECT current_database()::text, current_user::text", &[])
            .await
            .map_err(|e| statement_error("query session info", &e))?;

        Ok(SessionInfo { database: column(&row, 0)?, user: column(&row, 1)? })
    }

    /// Drop the client and wait for the connection task to finish
    pub async fn close(self) {
        let Self { client, connection_task } = self;
        drop(client);
        if let Err(e) = connection_task.await {
            warn!(error = %e, "PostgreSQL connection task did not shut down cleanly");
        }
    }

    async fn rows(&self, sql: &str, params: &[&(dyn ToSql + Sync)], what: &str) -> Result<Vec<Row>> {
        debug!(operation = what, "query");
        self.client.query(sql, params).await.map_err(|e| statement_error(what, &e))
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)], what: &str) -> Result<u64> {
        debug!(operation = what, "execute");
        let affected =
            self.client.execute(sql, params).await.map_err(|e| statement_error(what, &e))?;
        debug!(operation = what, affected, "done");
        Ok(affected)
    }

    async fn count(&self, sql: &str, id: RowId, what: &str) -> Result<u64> {
        debug!(operation = what, id, "count");
        let row =
            self.client.query_opt(sql, &[&id]).await.map_err(|e| statement_error(what, &e))?;
        let count: Option<i64> = match row {
            Some(row) => column(&row, 0)?,
            None => None,
        };
        Ok(normalize_count(count))
    }
}

/// Read a column, turning type mismatches into errors instead of panics
fn column<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<T> {
    row.try_get(idx).map_err(|e| {
        let name = row.columns().get(idx).map_or("?", |c| c.name());
        StaffdeskError::query_failed(format!("Unexpected value in column '{name}': {e}"))
    })
}

fn department_from_row(row: &Row) -> Result<Department> {
    Ok(Department { id: column(row, 0)?, name: column(row, 1)? })
}

fn role_from_row(row: &Row) -> Result<RoleSummary> {
    Ok(RoleSummary {
        id: column(row, 0)?,
        title: column(row, 1)?,
        department: column(row, 2)?,
        salary: column(row, 3)?,
    })
}

fn summary_from_row(row: &Row) -> Result<EmployeeSummary> {
    let first_name: String = column(row, 1)?;
    let last_name: String = column(row, 2)?;
    let title: String = column(row, 3)?;
    let department: String = column(row, 4)?;
    Ok(EmployeeSummary {
        id: column(row, 0)?,
        label: EmployeeSummary::compose_label(&first_name, &last_name, &title, &department),
    })
}

fn detail_from_row(row: &Row) -> Result<EmployeeDetail> {
    Ok(EmployeeDetail {
        id: column(row, 0)?,
        first_name: column(row, 1)?,
        last_name: column(row, 2)?,
        title: column(row, 3)?,
        manager: column(row, 4)?,
        department: column(row, 5)?,
        salary: column(row, 6)?,
    })
}

fn member_from_row(row: &Row) -> Result<DepartmentMember> {
    Ok(DepartmentMember {
        department: column(row, 0)?,
        employee: column(row, 1)?,
        title: column(row, 2)?,
        manager: manager_label(column(row, 3)?),
    })
}

fn managed_from_row(row: &Row) -> Result<ManagedEmployee> {
    Ok(ManagedEmployee {
        manager: manager_label(column(row, 0)?),
        employee: column(row, 1)?,
        title: column(row, 2)?,
        department: column(row, 3)?,
    })
}

fn budget_from_row(row: &Row) -> Result<DepartmentBudget> {
    Ok(DepartmentBudget { department: column(row, 0)?, total_salary: column(row, 1)? })
}

/// Map a driver error, keeping the server's message for constraint violations
fn statement_error(what: &str, e: &tokio_postgres::Error) -> StaffdeskError {
    if e.is_closed() {
        return StaffdeskError::connection_failed(format!("Lost connection while trying to {what}"));
    }

    match e.as_db_error() {
        Some(db) => {
            let mut message = format!("Failed to {what}: {}", db.message());
            if let Some(detail) = db.detail() {
                message.push_str(&format!(" ({detail})"));
            }
            StaffdeskError::query_failed(message)
        }
        None => StaffdeskError::query_failed(format!("Failed to {what}: {e}")),
    }
}

impl StaffStore for PostgresStore {
    async fn list_departments(&self) -> Result<Vec<Department>> {
        let rows = self.rows(LIST_DEPARTMENTS, &[], "list departments").await?;
        rows.iter().map(department_from_row).collect()
    }

    async fn list_roles(&self) -> Result<Vec<RoleSummary>> {
        let rows = self.rows(LIST_ROLES, &[], "list roles").await?;
        rows.iter().map(role_from_row).collect()
    }

    async fn list_employee_summaries(&self) -> Result<Vec<EmployeeSummary>> {
        let rows = self.rows(LIST_EMPLOYEE_SUMMARIES, &[], "list employees").await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn list_employee_details(&self) -> Result<Vec<EmployeeDetail>> {
        let rows = self.rows(LIST_EMPLOYEE_DETAILS, &[], "list employee details").await?;
        rows.iter().map(detail_from_row).collect()
    }

    async fn list_employees_by_department(&self) -> Result<Vec<DepartmentMember>> {
        let rows =
            self.rows(LIST_EMPLOYEES_BY_DEPARTMENT, &[], "list employees by department").await?;
        rows.iter().map(member_from_row).collect()
    }

    async fn list_employees_by_manager(&self) -> Result<Vec<ManagedEmployee>> {
        let rows = self.rows(LIST_EMPLOYEES_BY_MANAGER, &[], "list employees by manager").await?;
        rows.iter().map(managed_from_row).collect()
    }

    async fn total_utilized_budget(&self, department_id: RowId) -> Result<Option<DepartmentBudget>> {
        let rows =
            self.rows(TOTAL_UTILIZED_BUDGET, &[&department_id], "sum department salaries").await?;
        rows.first().map(budget_from_row).transpose()
    }

    async fn insert_department(&self, name: &str) -> Result<u64> {
        self.execute(INSERT_DEPARTMENT, &[&name], "insert department").await
    }

    async fn insert_role(&self, title: &str, salary: &str, department_id: RowId) -> Result<u64> {
        self.execute(INSERT_ROLE, &[&title, &salary, &department_id], "insert role").await
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<u64> {
        self.execute(
            INSERT_EMPLOYEE,
            &[&employee.first_name, &employee.last_name, &employee.role_id, &employee.manager_id],
            "insert employee",
        )
        .await
    }

    async fn update_employee_role(&self, employee_id: RowId, role_id: RowId) -> Result<u64> {
        self.execute(UPDATE_EMPLOYEE_ROLE, &[&role_id, &employee_id], "update employee role").await
    }

    async fn update_employee_manager(
        &self,
        employee_id: RowId,
        manager_id: Option<RowId>,
    ) -> Result<u64> {
        self.execute(UPDATE_EMPLOYEE_MANAGER, &[&manager_id, &employee_id], "update employee manager")
            .await
    }

    async fn count_roles_referencing_department(&self, department_id: RowId) -> Result<u64> {
        self.count(COUNT_ROLES_IN_DEPARTMENT, department_id, "count roles in department").await
    }

    async fn count_employees_referencing_role(&self, role_id: RowId) -> Result<u64> {
        self.count(COUNT_EMPLOYEES_IN_ROLE, role_id, "count employees in role").await
    }

    async fn count_employees_managed_by(&self, employee_id: RowId) -> Result<u64> {
        self.count(COUNT_DIRECT_REPORTS, employee_id, "count direct reports").await
    }

    async fn remove_department(&self, department_id: RowId) -> Result<u64> {
        self.execute(DELETE_DEPARTMENT, &[&department_id], "delete department").await
    }

    async fn remove_role(&self, role_id: RowId) -> Result<u64> {
        self.execute(DELETE_ROLE, &[&role_id], "delete role").await
    }

    async fn remove_employee(&self, employee_id: RowId) -> Result<u64> {
        self.execute(DELETE_EMPLOYEE, &[&employee_id], "delete employee").await
    }
}
