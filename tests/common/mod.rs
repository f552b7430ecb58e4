//! Shared test helpers: an in-memory `StaffStore` and a scripted `Prompter`.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use staffdesk::{
    Department, DepartmentBudget, DepartmentMember, EmployeeDetail, EmployeeSummary,
    ManagedEmployee, NewEmployee, Prompter, Result, RoleSummary, RowId, StaffStore,
    StaffdeskError, NO_MANAGER_LABEL,
};

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone)]
pub struct RoleRow {
    pub id: RowId,
    pub title: String,
    pub salary: i64,
    pub department_id: RowId,
}

#[derive(Debug, Clone)]
pub struct EmployeeRow {
    pub id: RowId,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RowId,
    pub manager_id: Option<RowId>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: RowId,
    departments: Vec<Department>,
    roles: Vec<RoleRow>,
    employees: Vec<EmployeeRow>,
}

impl Tables {
    fn next(&mut self) -> RowId {
        self.next_id += 1;
        self.next_id
    }

    fn department_name(&self, id: RowId) -> Option<&str> {
        self.departments.iter().find(|d| d.id == id).map(|d| d.name.as_str())
    }

    fn role(&self, id: RowId) -> Option<&RoleRow> {
        self.roles.iter().find(|r| r.id == id)
    }

    fn employee(&self, id: RowId) -> Option<&EmployeeRow> {
        self.employees.iter().find(|e| e.id == id)
    }

    fn full_name(&self, id: Option<RowId>) -> Option<String> {
        id.and_then(|id| self.employee(id)).map(|m| format!("{} {}", m.first_name, m.last_name))
    }

    /// Employees joined with role and department (inner joins)
    fn joined(&self) -> Vec<(&EmployeeRow, &RoleRow, &str)> {
        self.employees
            .iter()
            .filter_map(|e| {
                let role = self.role(e.role_id)?;
                let department = self.department_name(role.department_id)?;
                Some((e, role, department))
            })
            .collect()
    }
}

fn fk_violation(table: &str, column: &str) -> StaffdeskError {
    StaffdeskError::query_failed(format!(
        "insert or update on table \"{table}\" violates foreign key constraint on \"{column}\""
    ))
}

/// `StaffStore` backed by vectors, mirroring the PostgreSQL statements
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: Mutex<Vec<String>>,
    pending_failure: Mutex<Option<(Option<&'static str>, StaffdeskError)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the call, then hand out the pending failure if it targets this call
    fn record(&self, call: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        let mut pending = self.pending_failure.lock().unwrap();
        let fires = matches!(&*pending, Some((target, _)) if target.map_or(true, |t| t == call));
        match pending.take() {
            Some((_, err)) if fires => Err(err),
            other => {
                *pending = other;
                Ok(())
            }
        }
    }

    /// Make the next store call fail with `err`
    pub fn fail_next(&self, err: StaffdeskError) {
        *self.pending_failure.lock().unwrap() = Some((None, err));
    }

    /// Make the next call to the store method named `call` fail with `err`
    pub fn fail_on(&self, call: &'static str, err: StaffdeskError) {
        *self.pending_failure.lock().unwrap() = Some((Some(call), err));
    }

    /// Names of the store methods called so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_department(&self, name: &str) -> RowId {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.departments.push(Department { id, name: name.to_string() });
        id
    }

    pub fn add_role(&self, title: &str, salary: i64, department_id: RowId) -> RowId {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.roles.push(RoleRow { id, title: title.to_string(), salary, department_id });
        id
    }

    pub fn add_employee(&self, first: &str, last: &str, role_id: RowId, manager_id: Option<RowId>) -> RowId {
        let mut t = self.tables.lock().unwrap();
        let id = t.next();
        t.employees.push(EmployeeRow {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            role_id,
            manager_id,
        });
        id
    }

    pub fn employee(&self, id: RowId) -> Option<EmployeeRow> {
        self.tables.lock().unwrap().employee(id).cloned()
    }

    pub fn has_department(&self, id: RowId) -> bool {
        self.tables.lock().unwrap().department_name(id).is_some()
    }

    pub fn has_role(&self, id: RowId) -> bool {
        self.tables.lock().unwrap().role(id).is_some()
    }

    pub fn has_employee(&self, id: RowId) -> bool {
        self.tables.lock().unwrap().employee(id).is_some()
    }
}

impl StaffStore for MemoryStore {
    async fn list_departments(&self) -> Result<Vec<Department>> {
        self.record("list_departments")?;
        let mut rows = self.tables.lock().unwrap().departments.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_roles(&self) -> Result<Vec<RoleSummary>> {
        self.record("list_roles")?;
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<RoleSummary> = t
            .roles
            .iter()
            .filter_map(|r| {
                Some(RoleSummary {
                    id: r.id,
                    title: r.title.clone(),
                    department: t.department_name(r.department_id)?.to_string(),
                    salary: r.salary.to_string(),
                })
            })
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn list_employee_summaries(&self) -> Result<Vec<EmployeeSummary>> {
        self.record("list_employee_summaries")?;
        let t = self.tables.lock().unwrap();
        let mut joined = t.joined();
        joined.sort_by(|a, b| {
            (a.2, &a.0.last_name, &a.0.first_name).cmp(&(b.2, &b.0.last_name, &b.0.first_name))
        });
        Ok(joined
            .into_iter()
            .map(|(e, r, d)| EmployeeSummary {
                id: e.id,
                label: EmployeeSummary::compose_label(&e.first_name, &e.last_name, &r.title, d),
            })
            .collect())
    }

    async fn list_employee_details(&self) -> Result<Vec<EmployeeDetail>> {
        self.record("list_employee_details")?;
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<EmployeeDetail> = t
            .joined()
            .into_iter()
            .map(|(e, r, d)| EmployeeDetail {
                id: e.id,
                first_name: e.first_name.clone(),
                last_name: e.last_name.clone(),
                title: r.title.clone(),
                manager: t.full_name(e.manager_id),
                department: d.to_string(),
                salary: r.salary.to_string(),
            })
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    async fn list_employees_by_department(&self) -> Result<Vec<DepartmentMember>> {
        self.record("list_employees_by_department")?;
        let t = self.tables.lock().unwrap();
        let mut joined = t.joined();
        joined.sort_by(|a, b| {
            (a.2, &a.0.last_name, &a.0.first_name).cmp(&(b.2, &b.0.last_name, &b.0.first_name))
        });
        Ok(joined
            .into_iter()
            .map(|(e, r, d)| DepartmentMember {
                department: d.to_string(),
                employee: format!("{} {}", e.first_name, e.last_name),
                title: r.title.clone(),
                manager: t.full_name(e.manager_id).unwrap_or_else(|| NO_MANAGER_LABEL.to_string()),
            })
            .collect())
    }

    async fn list_employees_by_manager(&self) -> Result<Vec<ManagedEmployee>> {
        self.record("list_employees_by_manager")?;
        let t = self.tables.lock().unwrap();
        let mut joined = t.joined();
        joined.sort_by(|a, b| {
            let ma = t.full_name(a.0.manager_id);
            let mb = t.full_name(b.0.manager_id);
            (ma, &a.0.last_name, &a.0.first_name).cmp(&(mb, &b.0.last_name, &b.0.first_name))
        });
        Ok(joined
            .into_iter()
            .map(|(e, r, d)| ManagedEmployee {
                manager: t.full_name(e.manager_id).unwrap_or_else(|| NO_MANAGER_LABEL.to_string()),
                employee: format!("{} {}", e.first_name, e.last_name),
                title: r.title.clone(),
                department: d.to_string(),
            })
            .collect())
    }

    async fn total_utilized_budget(&self, department_id: RowId) -> Result<Option<DepartmentBudget>> {
        self.record("total_utilized_budget")?;
        let t = self.tables.lock().unwrap();
        let salaries: Vec<i64> = t
            .joined()
            .into_iter()
            .filter(|(_, r, _)| r.department_id == department_id)
            .map(|(_, r, _)| r.salary)
            .collect();
        if salaries.is_empty() {
            return Ok(None);
        }
        Ok(Some(DepartmentBudget {
            department: t.department_name(department_id).unwrap_or_default().to_string(),
            total_salary: salaries.iter().sum::<i64>().to_string(),
        }))
    }

    async fn insert_department(&self, name: &str) -> Result<u64> {
        self.record("insert_department")?;
        let mut t = self.tables.lock().unwrap();
        if t.departments.iter().any(|d| d.name == name) {
            return Err(StaffdeskError::query_failed(
                "duplicate key value violates unique constraint \"department_name_key\"",
            ));
        }
        let id = t.next();
        t.departments.push(Department { id, name: name.to_string() });
        Ok(1)
    }

    async fn insert_role(&self, title: &str, salary: &str, department_id: RowId) -> Result<u64> {
        self.record("insert_role")?;
        let salary: i64 = salary.trim().parse().map_err(|_| {
            StaffdeskError::query_failed(format!("invalid input syntax for type numeric: \"{salary}\""))
        })?;
        let mut t = self.tables.lock().unwrap();
        if t.department_name(department_id).is_none() {
            return Err(fk_violation("role", "department_id"));
        }
        let id = t.next();
        t.roles.push(RoleRow { id, title: title.to_string(), salary, department_id });
        Ok(1)
    }

    async fn insert_employee(&self, employee: &NewEmployee) -> Result<u64> {
        self.record("insert_employee")?;
        let mut t = self.tables.lock().unwrap();
        if t.role(employee.role_id).is_none() {
            return Err(fk_violation("employee", "role_id"));
        }
        if employee.manager_id.is_some_and(|m| t.employee(m).is_none()) {
            return Err(fk_violation("employee", "manager_id"));
        }
        let id = t.next();
        t.employees.push(EmployeeRow {
            id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            role_id: employee.role_id,
            manager_id: employee.manager_id,
        });
        Ok(1)
    }

    async fn update_employee_role(&self, employee_id: RowId, role_id: RowId) -> Result<u64> {
        self.record("update_employee_role")?;
        let mut t = self.tables.lock().unwrap();
        if t.role(role_id).is_none() {
            return Err(fk_violation("employee", "role_id"));
        }
        let mut updated = 0;
        for e in t.employees.iter_mut().filter(|e| e.id == employee_id) {
            e.role_id = role_id;
            updated += 1;
        }
        Ok(updated)
    }

    async fn update_employee_manager(&self, employee_id: RowId, manager_id: Option<RowId>) -> Result<u64> {
        self.record("update_employee_manager")?;
        let mut t = self.tables.lock().unwrap();
        if manager_id.is_some_and(|m| t.employee(m).is_none()) {
            return Err(fk_violation("employee", "manager_id"));
        }
        let mut updated = 0;
        for e in t.employees.iter_mut().filter(|e| e.id == employee_id) {
            e.manager_id = manager_id;
            updated += 1;
        }
        Ok(updated)
    }

    async fn count_roles_referencing_department(&self, department_id: RowId) -> Result<u64> {
        self.record("count_roles_referencing_department")?;
        let t = self.tables.lock().unwrap();
        Ok(t.roles.iter().filter(|r| r.department_id == department_id).count() as u64)
    }

    async fn count_employees_referencing_role(&self, role_id: RowId) -> Result<u64> {
        self.record("count_employees_referencing_role")?;
        let t = self.tables.lock().unwrap();
        Ok(t.employees.iter().filter(|e| e.role_id == role_id).count() as u64)
    }

    async fn count_employees_managed_by(&self, employee_id: RowId) -> Result<u64> {
        self.record("count_employees_managed_by")?;
        let t = self.tables.lock().unwrap();
        Ok(t.employees.iter().filter(|e| e.manager_id == Some(employee_id)).count() as u64)
    }

    async fn remove_department(&self, department_id: RowId) -> Result<u64> {
        self.record("remove_department")?;
        let mut t = self.tables.lock().unwrap();
        let before = t.departments.len();
        t.departments.retain(|d| d.id != department_id);
        Ok((before - t.departments.len()) as u64)
    }

    async fn remove_role(&self, role_id: RowId) -> Result<u64> {
        self.record("remove_role")?;
        let mut t = self.tables.lock().unwrap();
        let before = t.roles.len();
        t.roles.retain(|r| r.id != role_id);
        Ok((before - t.roles.len()) as u64)
    }

    async fn remove_employee(&self, employee_id: RowId) -> Result<u64> {
        self.record("remove_employee")?;
        let mut t = self.tables.lock().unwrap();
        let before = t.employees.len();
        t.employees.retain(|e| e.id != employee_id);
        Ok((before - t.employees.len()) as u64)
    }
}

// ============================================================================
// Scripted prompter
// ============================================================================

/// One scripted answer
#[derive(Debug, Clone)]
pub enum Answer {
    /// Pick the item with this label, or the first one starting with it
    Pick(&'static str),
    /// Type this text
    Text(&'static str),
}

/// A prompt that was shown, with the items offered (empty for text input)
#[derive(Debug, Clone)]
pub struct Shown {
    pub message: String,
    pub items: Vec<String>,
}

/// Plays back answers in order; runs out with a `PromptFailed` error
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    shown: Mutex<Vec<Shown>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self { answers: Mutex::new(answers.into()), shown: Mutex::new(Vec::new()) }
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, message: &str, items: &[String]) -> Result<Answer> {
        self.shown
            .lock()
            .unwrap()
            .push(Shown { message: message.to_string(), items: items.to_vec() });
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StaffdeskError::prompt_failed("script exhausted"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&self, message: &str, items: &[String]) -> Result<usize> {
        match self.next(message, items)? {
            Answer::Pick(label) => items
                .iter()
                .position(|i| i == label)
                .or_else(|| items.iter().position(|i| i.starts_with(label)))
                .ok_or_else(|| {
                    StaffdeskError::prompt_failed(format!(
                        "'{label}' not offered by '{message}': {items:?}"
                    ))
                }),
            Answer::Text(text) => {
                Err(StaffdeskError::prompt_failed(format!("expected a selection, scripted text '{text}'")))
            }
        }
    }

    fn input(&self, message: &str) -> Result<String> {
        match self.next(message, &[])? {
            Answer::Text(text) => Ok(text.to_string()),
            Answer::Pick(label) => {
                Err(StaffdeskError::prompt_failed(format!("expected text input, scripted pick '{label}'")))
            }
        }
    }
}
