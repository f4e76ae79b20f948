//! Model types for projects, tasks, tags, and settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board status of a task.
///
/// The declaration order is the default column order of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Not started yet (default).
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Waiting for review.
    Review,
    /// Finished.
    Done,
}

impl Status {
    /// All statuses in default board order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Review, Self::Done];

    /// Parse a status from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid status.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidStatus> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in-progress" | "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }

    /// Get the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Column heading used when rendering the board.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl std::fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid status: '{}' (must be one of: todo, in-progress, review, done)",
            self.0
        )
    }
}

impl std::error::Error for InvalidStatus {}

/// Task priority, ordered from least to most pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have.
    Low,
    /// Normal work (default).
    #[default]
    Medium,
    /// Should be done soon.
    High,
    /// Drop everything.
    Urgent,
}

impl Priority {
    /// Parse a priority from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid priority.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidPriority> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }

    /// Get the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid priority string is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPriority(pub String);

impl std::fmt::Display for InvalidPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid priority: '{}' (must be one of: low, medium, high, urgent)", self.0)
    }
}

impl std::error::Error for InvalidPriority {}

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme.
    Dark,
    /// Follow the operating system (default).
    #[default]
    System,
}

impl Theme {
    /// Parse a theme from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid theme.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidSetting> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(InvalidSetting { setting: "theme", value: s.to_string() }),
        }
    }

    /// Get the string representation of the theme.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

/// View opened on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    /// Kanban board (default).
    #[default]
    Board,
    /// Calendar of due dates.
    Calendar,
    /// Flat task list.
    List,
}

impl DefaultView {
    /// Parse a view from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid view.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidSetting> {
        match s.to_lowercase().as_str() {
            "board" => Ok(Self::Board),
            "calendar" => Ok(Self::Calendar),
            "list" => Ok(Self::List),
            _ => Err(InvalidSetting { setting: "default view", value: s.to_string() }),
        }
    }

    /// Get the string representation of the view.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Calendar => "calendar",
            Self::List => "list",
        }
    }
}

/// Error when a settings value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    /// Which setting was being parsed.
    pub setting: &'static str,
    /// The rejected value.
    pub value: String,
}

impl std::fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: '{}'", self.setting, self.value)
    }
}

impl std::error::Error for InvalidSetting {}

/// A project groups tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (slug from name + random hex suffix).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Display color token, `#RRGGBB`.
    pub color: String,
    /// Optional icon name.
    pub icon: Option<String>,
    /// Archived projects are hidden from the default listing.
    pub archived: bool,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (slug from title + random hex suffix).
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Board column.
    pub status: Status,
    /// Priority.
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Tag names. Not checked against the tag table.
    pub tags: Vec<String>,
    /// Optional assignee.
    pub assigned_to: Option<String>,
    /// Set the first time the task reaches `done`; never cleared automatically.
    pub completed_at: Option<DateTime<Utc>>,
    /// Sort key within the status partition.
    pub position: u32,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is past its due date and not done.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != Status::Done && self.due_date.is_some_and(|due| due < now)
    }
}

/// A named, colored label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier.
    pub id: String,
    /// Name, as referenced from `Task::tags`.
    pub name: String,
    /// Display color token.
    pub color: String,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

/// A file stored alongside the planner data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique identifier.
    pub id: String,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Base64-encoded content.
    pub data: String,
    /// Size of the decoded content in bytes.
    pub size: u64,
    /// When the attachment was stored.
    pub created_at: DateTime<Utc>,
}

/// Singleton application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Color theme.
    pub theme: Theme,
    /// View opened on startup.
    pub default_view: DefaultView,
    /// Board columns, in display order.
    pub board_columns: Vec<Status>,
    /// Whether due-date notifications are enabled.
    pub notifications: bool,
    /// Whether edits are saved without confirmation.
    pub auto_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            default_view: DefaultView::Board,
            board_columns: Status::ALL.to_vec(),
            notifications: true,
            auto_save: true,
        }
    }
}

/// An entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for the entry.
    pub id: i64,
    /// RFC 3339 timestamp of the operation.
    pub timestamp: String,
    /// Type of operation (e.g., "create", "update", "delete").
    pub operation: String,
    /// Entity kind ("project", "task", "tag", ...).
    pub entity: String,
    /// ID of the affected entity.
    pub entity_id: Option<String>,
    /// Additional details about the operation.
    pub details: Option<String>,
}
