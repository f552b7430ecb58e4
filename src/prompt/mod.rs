//! Selection Prompts
//!
//! Turns a listing from the store into a terminal choice and hands back the
//! id of the chosen row. A failed listing propagates before anything is shown.
//!
//! Terminal access goes through [`Prompter`] so the menu can be driven by a
//! script in tests; [`TerminalPrompter`] is the `dialoguer` implementation.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::error::{Result, StaffdeskError};
use crate::store::{RowId, StaffStore, NO_MANAGER_LABEL};

/// Blocking terminal interaction
pub trait Prompter {
    /// Show `items` and return the index of the one picked
    fn select(&self, message: &str, items: &[String]) -> Result<usize>;

    /// Ask for a non-empty line of text
    fn input(&self, message: &str) -> Result<String>;
}

/// `dialoguer` prompts on the attached terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, items: &[String]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()
            .map_err(|e| StaffdeskError::prompt_failed(e.to_string()))
    }

    fn input(&self, message: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(message)
            .validate_with(|answer: &String| -> std::result::Result<(), &str> {
                if answer.trim().is_empty() {
                    Err("A value is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(|e| StaffdeskError::prompt_failed(e.to_string()))?;
        Ok(answer.trim().to_string())
    }
}

/// One selectable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: RowId,
    pub label: String,
}

impl Choice {
    pub fn new(id: RowId, label: impl Into<String>) -> Self {
        Self { id, label: label.into() }
    }
}

/// Outcome of a manager selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerChoice {
    Manager(RowId),
    NoManager,
}

impl ManagerChoice {
    /// Value for the nullable `manager_id` column
    #[must_use]
    pub const fn manager_id(self) -> Option<RowId> {
        match self {
            Self::Manager(id) => Some(id),
            Self::NoManager => None,
        }
    }
}

/// Ask the user to pick one of `choices` and return its id
///
/// `what` names the kind of row in the error when there is nothing to pick.
pub fn choose<P: Prompter>(prompter: &P, message: &str, choices: &[Choice], what: &str) -> Result<RowId> {
    if choices.is_empty() {
        return Err(StaffdeskError::invalid_input(format!("No {what} exist yet, add one first")));
    }

    let labels: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
    let index = prompter.select(message, &labels)?;
    choices
        .get(index)
        .map(|c| c.id)
        .ok_or_else(|| StaffdeskError::prompt_failed(format!("Selection {index} is out of range")))
}

/// Pick a department by name
pub async fn select_department<S, P>(store: &S, prompter: &P, message: &str) -> Result<RowId>
where
    S: StaffStore,
    P: Prompter,
{
    let choices: Vec<Choice> =
        store.list_departments().await?.into_iter().map(|d| Choice::new(d.id, d.name)).collect();
    choose(prompter, message, &choices, "departments")
}

/// Pick a role by title
pub async fn select_role<S, P>(store: &S, prompter: &P, message: &str) -> Result<RowId>
where
    S: StaffStore,
    P: Prompter,
{
    let choices: Vec<Choice> =
        store.list_roles().await?.into_iter().map(|r| Choice::new(r.id, r.title)).collect();
    choose(prompter, message, &choices, "roles")
}

/// Pick an employee by their composite label
pub async fn select_employee<S, P>(store: &S, prompter: &P, message: &str) -> Result<RowId>
where
    S: StaffStore,
    P: Prompter,
{
    let choices: Vec<Choice> = store
        .list_employee_summaries()
        .await?
        .into_iter()
        .map(|e| Choice::new(e.id, e.label))
        .collect();
    choose(prompter, message, &choices, "employees")
}

/// Pick a manager, or "No Manager"
///
/// The "No Manager" entry is listed first and is always available, even when
/// there are no employees yet.
pub async fn select_manager<S, P>(store: &S, prompter: &P, message: &str) -> Result<ManagerChoice>
where
    S: StaffStore,
    P: Prompter,
{
    let employees = store.list_employee_summaries().await?;

    let mut labels = Vec::with_capacity(employees.len() + 1);
    labels.push(NO_MANAGER_LABEL.to_string());
    labels.extend(employees.iter().map(|e| e.label.clone()));

    let index = prompter.select(message, &labels)?;
    match index {
        0 => Ok(ManagerChoice::NoManager),
        n => employees
            .get(n - 1)
            .map(|e| ManagerChoice::Manager(e.id))
            .ok_or_else(|| StaffdeskError::prompt_failed(format!("Selection {n} is out of range"))),
    }
}
