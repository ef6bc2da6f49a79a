//! Controlled input forms. They validate and build payloads; whoever owns
//! the form decides what to do with the payload.

use crate::error::ValidationError;
use crate::helpers::{
    is_valid_email, is_valid_priority, parse_date, DEFAULT_PRIORITY, MAX_PRIORITY, MIN_PRIORITY,
};
use crate::project::{NewProject, ProjectId};
use crate::task::{Task, TaskDraft, TaskStatus};
use crate::user::{Credentials, UserId};

/// Field-cursor editing shared by every form the terminal renders.
pub trait Form {
    fn labels(&self) -> &'static [&'static str];
    fn focus(&self) -> usize;
    fn set_focus(&mut self, focus: usize);
    /// Text shown for field `idx`.
    fn value(&self, idx: usize) -> String;
    fn input(&mut self, c: char);
    fn backspace(&mut self);
    /// Left/Right on choice fields; text fields ignore it.
    fn step(&mut self, _direction: isize) {}
    fn error(&self) -> Option<&str>;
    fn clear_error(&mut self);

    fn next_field(&mut self, direction: isize) {
        let len = self.labels().len() as isize;
        let next = (self.focus() as isize + direction).rem_euclid(len);
        self.set_focus(next as usize);
    }
}

fn optional_date(value: &str, label: &str) -> Result<Option<String>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match parse_date(value) {
        Some(d) => Ok(Some(d.format("%Y-%m-%d").to_string())),
        None => Err(ValidationError::new(format!(
            "{label} must be a date (YYYY-MM-DD)"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub error: Option<String>,
    focus: usize,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, user_id: UserId) -> Result<NewProject, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("Project title is required"));
        }
        Ok(NewProject {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            start_date: optional_date(&self.start_date, "Start date")?,
            end_date: optional_date(&self.end_date, "End date")?,
            user_id,
        })
    }

    /// Validates and records the inline error on failure.
    pub fn submit(&mut self, user_id: UserId) -> Option<NewProject> {
        match self.validate(user_id) {
            Ok(project) => {
                self.error = None;
                Some(project)
            }
            Err(err) => {
                self.error = Some(err.0);
                None
            }
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.title,
            1 => &mut self.description,
            2 => &mut self.start_date,
            _ => &mut self.end_date,
        }
    }
}

impl Form for ProjectForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Project Title *", "Description", "Start Date", "End Date"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus.min(self.labels().len() - 1);
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.title.clone(),
            1 => self.description.clone(),
            2 => self.start_date.clone(),
            _ => self.end_date.clone(),
        }
    }

    fn input(&mut self, c: char) {
        self.field_mut().push(c);
    }

    fn backspace(&mut self) {
        self.field_mut().pop();
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Empty, or an ISO date.
    pub due_date: String,
    pub priority: i32,
    pub project_id: Option<ProjectId>,
    pub error: Option<String>,
    focus: usize,
}

impl TaskForm {
    const TITLE: usize = 0;
    const DESCRIPTION: usize = 1;
    const STATUS: usize = 2;
    const DUE_DATE: usize = 3;
    const PRIORITY: usize = 4;

    pub fn new(project_id: Option<ProjectId>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Pending,
            due_date: String::new(),
            priority: DEFAULT_PRIORITY,
            project_id,
            error: None,
            focus: 0,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        let due_date = task
            .due_date
            .as_deref()
            .and_then(|d| d.split('T').next())
            .unwrap_or_default()
            .to_string();
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            due_date,
            priority: task.effective_priority(),
            project_id: task.project_id(),
            error: None,
            focus: 0,
        }
    }

    /// Takes typed priority text the way a number input would; anything
    /// that is not an integer leaves 0, which fails the range check.
    pub fn set_priority_text(&mut self, text: &str) {
        self.priority = crate::helpers::parse_priority(text).unwrap_or(0);
    }

    /// Checks that apply to both creating and editing.
    pub fn validate_fields(&self) -> Result<Option<String>, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("Task title is required"));
        }
        if !is_valid_priority(self.priority) {
            return Err(ValidationError::new("Priority must be between 1 and 10"));
        }
        optional_date(&self.due_date, "Due date")
    }

    pub fn validate(&self) -> Result<TaskDraft, ValidationError> {
        let due_date = self.validate_fields()?;
        let project_id = self
            .project_id
            .ok_or_else(|| ValidationError::new("Project ID is required"))?;
        Ok(TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            status: self.status,
            due_date,
            priority: self.priority,
            project_id,
        })
    }

    pub fn submit(&mut self) -> Option<TaskDraft> {
        match self.validate() {
            Ok(draft) => {
                self.error = None;
                Some(draft)
            }
            Err(err) => {
                self.error = Some(err.0);
                None
            }
        }
    }

    /// The full task to PUT: `task` with this form's edits laid over it.
    pub fn apply_to(&self, task: &Task) -> Result<Task, ValidationError> {
        let due_date = self.validate_fields()?;
        let description = if self.description.is_empty() {
            None
        } else {
            Some(self.description.clone())
        };
        Ok(Task {
            title: self.title.trim().to_string(),
            description,
            status: self.status,
            due_date,
            priority: Some(self.priority),
            ..task.clone()
        })
    }
}

impl Form for TaskForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Title *", "Description", "Status", "Due Date", "Priority"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus.min(self.labels().len() - 1);
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            Self::TITLE => self.title.clone(),
            Self::DESCRIPTION => self.description.clone(),
            Self::STATUS => self.status.label().to_string(),
            Self::DUE_DATE => self.due_date.clone(),
            _ => self.priority.to_string(),
        }
    }

    fn input(&mut self, c: char) {
        match self.focus {
            Self::TITLE => self.title.push(c),
            Self::DESCRIPTION => self.description.push(c),
            Self::DUE_DATE => self.due_date.push(c),
            // Two digits are enough to show an out-of-range value.
            Self::PRIORITY if c.is_ascii_digit() && self.priority < 10 => {
                let text = format!("{}{c}", self.priority);
                self.set_priority_text(&text);
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            Self::TITLE => {
                self.title.pop();
            }
            Self::DESCRIPTION => {
                self.description.pop();
            }
            Self::DUE_DATE => {
                self.due_date.pop();
            }
            Self::PRIORITY => self.priority /= 10,
            _ => {}
        }
    }

    fn step(&mut self, direction: isize) {
        match self.focus {
            Self::STATUS => self.status = self.status.step(direction),
            Self::PRIORITY => {
                self.priority = self
                    .priority
                    .saturating_add(direction as i32)
                    .clamp(MIN_PRIORITY, MAX_PRIORITY)
            }
            _ => {}
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub name: String,
    pub error: Option<String>,
    focus: usize,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        if self.email.is_empty() || self.name.is_empty() {
            return Err(ValidationError::new("Email and name are required"));
        }
        Ok(Credentials::new(self.name.clone(), self.email.clone()))
    }
}

impl Form for LoginForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Email *", "Name *"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus.min(1);
    }

    fn value(&self, idx: usize) -> String {
        if idx == 0 {
            self.email.clone()
        } else {
            self.name.clone()
        }
    }

    fn input(&mut self, c: char) {
        if self.focus == 0 {
            self.email.push(c);
        } else {
            self.name.push(c);
        }
    }

    fn backspace(&mut self) {
        if self.focus == 0 {
            self.email.pop();
        } else {
            self.name.pop();
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub error: Option<String>,
    focus: usize,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Credentials, ValidationError> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(ValidationError::new("Name and email are required"));
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::new("Please enter a valid email address"));
        }
        Ok(Credentials::new(self.name.clone(), self.email.clone()))
    }
}

impl Form for RegisterForm {
    fn labels(&self) -> &'static [&'static str] {
        &["Full Name *", "Email *"]
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, focus: usize) {
        self.focus = focus.min(1);
    }

    fn value(&self, idx: usize) -> String {
        if idx == 0 {
            self.name.clone()
        } else {
            self.email.clone()
        }
    }

    fn input(&mut self, c: char) {
        if self.focus == 0 {
            self.name.push(c);
        } else {
            self.email.push(c);
        }
    }

    fn backspace(&mut self) {
        if self.focus == 0 {
            self.name.pop();
        } else {
            self.email.pop();
        }
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}
