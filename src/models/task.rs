use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format accepted by the creation form and sent to the service.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Picker order.
    pub const ALL: [TaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Exact service label only; see [`FromStr`] for the lenient CLI form.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == label)
    }

    /// Position of this status in [`TaskStatus::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    /// Accepts the service labels ("In Progress") as well as the
    /// command-line spellings `in-progress` and `in_progress`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "not started" => Ok(Self::NotStarted),
            "in progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => anyhow::bail!("invalid task status: {s}"),
        }
    }
}

/// Flat view of a task page, as rendered by the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: String,
}

/// Scratch input of the creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("title is required")]
    MissingTitle,
    #[error("due date is required")]
    MissingDueDate,
    #[error("invalid due date {0:?}, expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.due_date.is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.due_date.clear();
    }

    /// Form-level validation: both fields required, due date must parse.
    pub fn validate(&self) -> Result<NewTask, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        let due = self.due_date.trim();
        if due.is_empty() {
            return Err(DraftError::MissingDueDate);
        }
        let due_date = NaiveDate::parse_from_str(due, DUE_DATE_FORMAT)
            .map_err(|_| DraftError::InvalidDueDate(due.to_string()))?;
        Ok(NewTask {
            title: self.title.clone(),
            due_date,
        })
    }
}

/// A validated draft, ready to be sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDate,
}

impl NewTask {
    pub fn due_date_string(&self) -> String {
        self.due_date.format(DUE_DATE_FORMAT).to_string()
    }
}
