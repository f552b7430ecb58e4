//! Command Dispatcher
//!
//! Shows the main menu, runs the chosen action to completion (prompts and
//! database round-trip included), and shows the menu again. "Exit" is the
//! only way out of the loop. Failed actions are reported and the loop goes on.

use std::io::Write;

use tracing::{debug, warn};

use crate::error::{Result, StaffdeskError};
use crate::output::{render, OutputFormat, TableRow};
use crate::prompt::{select_department, select_employee, select_manager, select_role, Prompter};
use crate::store::integrity::{self, DeleteOutcome};
use crate::store::{NewEmployee, StaffStore};

/// Main menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ViewAllEmployees,
    ViewEmployeesByDepartment,
    ViewEmployeesByManager,
    AddEmployee,
    DeleteEmployee,
    UpdateEmployeeRole,
    UpdateEmployeeManager,
    ViewAllRoles,
    AddRole,
    DeleteRole,
    ViewAllDepartments,
    ViewDepartmentBudget,
    AddDepartment,
    DeleteDepartment,
    Exit,
}

impl MenuAction {
    pub const ALL: [Self; 15] = [
        Self::ViewAllEmployees,
        Self::ViewEmployeesByDepartment,
        Self::ViewEmployeesByManager,
        Self::AddEmployee,
        Self::DeleteEmployee,
        Self::UpdateEmployeeRole,
        Self::UpdateEmployeeManager,
        Self::ViewAllRoles,
        Self::AddRole,
        Self::DeleteRole,
        Self::ViewAllDepartments,
        Self::ViewDepartmentBudget,
        Self::AddDepartment,
        Self::DeleteDepartment,
        Self::Exit,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewAllEmployees => "View All Employees",
            Self::ViewEmployeesByDepartment => "View Employees By Department",
            Self::ViewEmployeesByManager => "View Employees By Manager",
            Self::AddEmployee => "Add An Employee",
            Self::DeleteEmployee => "Delete An Employee",
            Self::UpdateEmployeeRole => "Update Employee Role",
            Self::UpdateEmployeeManager => "Update Employee Manager",
            Self::ViewAllRoles => "View All Roles",
            Self::AddRole => "Add A Role",
            Self::DeleteRole => "Delete A Role",
            Self::ViewAllDepartments => "View All Departments",
            Self::ViewDepartmentBudget => "View A Department's Total Utilized Budget",
            Self::AddDepartment => "Add A Department",
            Self::DeleteDepartment => "Delete A Department",
            Self::Exit => "Exit",
        }
    }
}

/// Whether the loop continues after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The interactive loop
///
/// Owns nothing but borrows: the store (and its connection) outlives the loop.
pub struct Dispatcher<'a, S, P, W> {
    store: &'a S,
    prompter: &'a P,
    out: W,
    format: OutputFormat,
}

impl<'a, S, P, W> Dispatcher<'a, S, P, W>
where
    S: StaffStore,
    P: Prompter,
    W: Write,
{
    pub fn new(store: &'a S, prompter: &'a P, out: W, format: OutputFormat) -> Self {
        Self { store, prompter, out, format }
    }

    /// Give back the writer (lets tests inspect what was printed)
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until the user picks "Exit"
    ///
    /// Returns an error only when the terminal itself fails.
    pub async fn run(&mut self) -> Result<()> {
        let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.label().to_string()).collect();

        loop {
            let index = self.prompter.select("What would you like to do?", &labels)?;
            let action = *MenuAction::ALL.get(index).ok_or_else(|| {
                StaffdeskError::prompt_failed(format!("Menu selection {index} is out of range"))
            })?;

            debug!(action = action.label(), "menu action selected");
            match self.dispatch(action).await {
                Ok(Flow::Exit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) if e.is_recoverable() => {
                    warn!(action = action.label(), code = e.error_code(), error = %e, "action failed");
                    self.say(&format!("Error: {e}"))?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run one menu action
    pub async fn dispatch(&mut self, action: MenuAction) -> Result<Flow> {
        match action {
            MenuAction::ViewAllEmployees => {
                let rows = self.store.list_employee_details().await?;
                self.show(&rows)?;
            }
            MenuAction::ViewEmployeesByDepartment => {
                let rows = self.store.list_employees_by_department().await?;
                self.show(&rows)?;
            }
            MenuAction::ViewEmployeesByManager => {
                let rows = self.store.list_employees_by_manager().await?;
                self.show(&rows)?;
            }
            MenuAction::AddEmployee => self.add_employee().await?,
            MenuAction::DeleteEmployee => {
                let id =
                    select_employee(self.store, self.prompter, "Select the employee to delete:")
                        .await?;
                let outcome = integrity::delete_employee(self.store, id).await?;
                self.report_delete(outcome)?;
            }
            MenuAction::UpdateEmployeeRole => {
                let employee_id = select_employee(
                    self.store,
                    self.prompter,
                    "Please select an employee for a new role:",
                )
                .await?;
                let role_id = select_role(self.store, self.prompter, "Select a role:").await?;
                let updated = self.store.update_employee_role(employee_id, role_id).await?;
                self.say(&format!("{updated} row(s) updated!"))?;
            }
            MenuAction::UpdateEmployeeManager => {
                let employee_id = select_employee(
                    self.store,
                    self.prompter,
                    "Please select an employee for a new manager:",
                )
                .await?;
                let manager =
                    select_manager(self.store, self.prompter, "Please select a manager:").await?;
                let updated =
                    self.store.update_employee_manager(employee_id, manager.manager_id()).await?;
                self.say(&format!("{updated} row(s) updated!"))?;
            }
            MenuAction::ViewAllRoles => {
                let rows = self.store.list_roles().await?;
                self.show(&rows)?;
            }
            MenuAction::AddRole => {
                let title = self.prompter.input("What is the title for the role?")?;
                let salary = self.prompter.input("What is the salary of the role?")?;
                let department_id =
                    select_department(self.store, self.prompter, "Choose a department:").await?;
                let inserted = self.store.insert_role(&title, &salary, department_id).await?;
                self.say(&format!("{inserted} row(s) inserted!"))?;
            }
            MenuAction::DeleteRole => {
                let id = select_role(self.store, self.prompter, "Select the role to delete:").await?;
                let outcome = integrity::delete_role(self.store, id).await?;
                self.report_delete(outcome)?;
            }
            MenuAction::ViewAllDepartments => {
                let rows = self.store.list_departments().await?;
                self.show(&rows)?;
            }
            MenuAction::ViewDepartmentBudget => {
                let id = select_department(self.store, self.prompter, "Choose a department:").await?;
                match self.store.total_utilized_budget(id).await? {
                    Some(budget) => self.show(&[budget])?,
                    None => self.say("No employees are assigned to roles in this department.")?,
                }
            }
            MenuAction::AddDepartment => {
                let name = self.prompter.input("What is the department's name?")?;
                let inserted = self.store.insert_department(&name).await?;
                self.say(&format!("{inserted} row(s) inserted!"))?;
            }
            MenuAction::DeleteDepartment => {
                let id =
                    select_department(self.store, self.prompter, "Select the department to delete:")
                        .await?;
                let outcome = integrity::delete_department(self.store, id).await?;
                self.report_delete(outcome)?;
            }
            MenuAction::Exit => return Ok(Flow::Exit),
        }

        Ok(Flow::Continue)
    }

    async fn add_employee(&mut self) -> Result<()> {
        let first_name = self.prompter.input("What is the first name of the employee?")?;
        let last_name = self.prompter.input("What is the last name of the employee?")?;
        let role_id = select_role(self.store, self.prompter, "Select a role:").await?;
        let manager = select_manager(self.store, self.prompter, "Please select a manager:").await?;

        let employee =
            NewEmployee { first_name, last_name, role_id, manager_id: manager.manager_id() };
        let inserted = self.store.insert_employee(&employee).await?;
        self.say(&format!("{inserted} row(s) inserted!"))
    }

    fn report_delete(&mut self, outcome: DeleteOutcome) -> Result<()> {
        match outcome {
            DeleteOutcome::Deleted(n) => self.say(&format!("{n} row(s) deleted!")),
            DeleteOutcome::Blocked(blocker) => self.say(&blocker.to_string()),
        }
    }

    fn show<T>(&mut self, rows: &[T]) -> Result<()>
    where
        T: TableRow + serde::Serialize,
    {
        let rendered = render(rows, self.format)?;
        self.say(rendered.trim_end())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")
            .map_err(|e| StaffdeskError::prompt_failed(format!("Could not write to the terminal: {e}")))
    }
}
