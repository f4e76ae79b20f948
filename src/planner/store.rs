//! The storage port: the `PlannerStore` trait and its input types.
//!
//! Collections and the board never talk to `SQLite` directly; they go through
//! this trait so they can run against [`super::memory::InMemoryStore`] in tests.

use crate::error::Result;
use crate::planner::models::{
    AuditEntry, Attachment, DefaultView, Priority, Project, Settings, Status, Tag, Task, Theme,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Trait for planner storage operations.
///
/// Every method either completes or fails with a storage error. Methods that
/// return `bool` report whether the addressed row existed.
#[allow(clippy::missing_errors_doc)]
pub trait PlannerStore {
    // Projects
    /// Create a project and return its generated ID.
    fn create_project(&self, project: NewProject) -> Result<String>;

    /// List non-archived projects, oldest first.
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// List archived projects, oldest first.
    fn list_archived_projects(&self) -> Result<Vec<Project>>;

    /// Get a project by ID, archived or not.
    fn get_project(&self, id: &str) -> Result<Option<Project>>;

    /// Update a project's fields.
    fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<bool>;

    /// Delete a project and every task that belongs to it.
    fn delete_project(&self, id: &str) -> Result<bool>;

    /// Mark a project archived without deleting it.
    fn archive_project(&self, id: &str) -> Result<bool>;

    // Tasks
    /// Create a task and return its generated ID.
    fn create_task(&self, task: NewTask) -> Result<String>;

    /// List all tasks ordered by position.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// List the tasks of one project ordered by position.
    fn tasks_by_project(&self, project_id: &str) -> Result<Vec<Task>>;

    /// List the tasks with one status ordered by position.
    fn tasks_by_status(&self, status: Status) -> Result<Vec<Task>>;

    /// Get a task by ID.
    fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// Update a task's fields.
    ///
    /// Moving a task to `done` stamps `completed_at` unless it is already set.
    fn update_task(&self, id: &str, update: TaskUpdate) -> Result<bool>;

    /// Delete a task.
    fn delete_task(&self, id: &str) -> Result<bool>;

    /// Set one task's position.
    fn update_task_position(&self, id: &str, position: u32) -> Result<bool>;

    /// Set many positions as one unit. Returns how many tasks were found.
    fn set_task_positions(&self, positions: &[PositionUpdate]) -> Result<usize>;

    // Tags
    /// Create a tag and return its generated ID.
    fn create_tag(&self, tag: NewTag) -> Result<String>;

    /// List tags ordered by name.
    fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Get a tag by ID.
    fn get_tag(&self, id: &str) -> Result<Option<Tag>>;

    /// Update a tag's fields.
    fn update_tag(&self, id: &str, update: TagUpdate) -> Result<bool>;

    /// Delete a tag. Tasks keep the name in their tag lists.
    fn delete_tag(&self, id: &str) -> Result<bool>;

    // Settings
    /// Read the settings singleton.
    fn settings(&self) -> Result<Settings>;

    /// Update the settings singleton and return the new value.
    fn update_settings(&self, update: SettingsUpdate) -> Result<Settings>;

    // Attachments
    /// Store an attachment and return its generated ID.
    fn create_attachment(&self, attachment: NewAttachment) -> Result<String>;

    /// Get an attachment by ID.
    fn get_attachment(&self, id: &str) -> Result<Option<Attachment>>;

    /// Delete an attachment.
    fn delete_attachment(&self, id: &str) -> Result<bool>;

    // Audit
    /// Get audit log entries, newest first, optionally for one entity.
    fn audit_log(&self, entity_id: Option<&str>, limit: Option<usize>)
        -> Result<Vec<AuditEntry>>;
}

/// Fields for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Display color, `#RRGGBB`.
    pub color: String,
    /// Optional icon name.
    pub icon: Option<String>,
    /// Whether the project starts archived.
    pub archived: bool,
}

impl NewProject {
    /// A visible project with the default color.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: DEFAULT_PROJECT_COLOR.to_string(),
            icon: None,
            archived: false,
        }
    }
}

/// Color given to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

/// Fields that can be updated on a project.
///
/// `Some(None)` clears an optional field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New color.
    pub color: Option<String>,
    /// New icon.
    pub icon: Option<Option<String>>,
    /// New archived flag.
    pub archived: Option<bool>,
}

impl ProjectUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.archived.is_none()
    }

    /// Apply the update to an in-memory project.
    pub fn apply(self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(color) = self.color {
            project.color = color;
        }
        if let Some(icon) = self.icon {
            project.icon = icon;
        }
        if let Some(archived) = self.archived {
            project.archived = archived;
        }
        project.updated_at = now;
    }
}

/// Fields for a new task. The store writes `position` as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: String,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial status.
    pub status: Status,
    /// Priority.
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Tag names.
    pub tags: Vec<String>,
    /// Optional assignee.
    pub assigned_to: Option<String>,
    /// Position within the status partition.
    pub position: u32,
}

impl NewTask {
    /// A `todo`/`medium` task at position 0.
    pub fn new(project_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            due_date: None,
            tags: Vec::new(),
            assigned_to: None,
            position: 0,
        }
    }
}

/// Fields that can be updated on a task.
///
/// `Some(None)` clears an optional field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Move to another project.
    pub project_id: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New status.
    pub status: Option<Status>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New assignee.
    pub assigned_to: Option<Option<String>>,
    /// Explicit completion time; takes precedence over the automatic stamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// New position.
    pub position: Option<u32>,
}

impl TaskUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.assigned_to.is_none()
            && self.completed_at.is_none()
            && self.position.is_none()
    }

    /// Whether this update stamps `completed_at` on a task that lacks one.
    #[must_use]
    pub fn completes(&self) -> bool {
        self.status == Some(Status::Done) && self.completed_at.is_none()
    }

    /// Apply the update to an in-memory task, including the completion stamp.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        let completes = self.completes();
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = Some(completed_at);
        } else if completes && task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
        if let Some(position) = self.position {
            task.position = position;
        }
        task.updated_at = now;
    }
}

/// One entry of a batch position write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    /// Task to move.
    pub task_id: String,
    /// Its new position.
    pub position: u32,
}

/// Fields for a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    /// Tag name.
    pub name: String,
    /// Display color.
    pub color: String,
}

/// Fields that can be updated on a tag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    /// New name.
    pub name: Option<String>,
    /// New color.
    pub color: Option<String>,
}

impl TagUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

/// Fields for a new attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Base64-encoded content.
    pub data: String,
    /// Decoded size in bytes.
    pub size: u64,
}

/// Fields that can be updated on the settings singleton.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// New theme.
    pub theme: Option<Theme>,
    /// New default view.
    pub default_view: Option<DefaultView>,
    /// New board column order.
    pub board_columns: Option<Vec<Status>>,
    /// Toggle notifications.
    pub notifications: Option<bool>,
    /// Toggle auto-save.
    pub auto_save: Option<bool>,
}

impl SettingsUpdate {
    /// Apply the update to a settings value.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(default_view) = self.default_view {
            settings.default_view = default_view;
        }
        if let Some(board_columns) = self.board_columns {
            settings.board_columns = board_columns;
        }
        if let Some(notifications) = self.notifications {
            settings.notifications = notifications;
        }
        if let Some(auto_save) = self.auto_save {
            settings.auto_save = auto_save;
        }
    }
}

/// Ordering used for every position-sorted task list: position, then age, then ID.
#[must_use]
pub fn by_position(a: &Task, b: &Task) -> Ordering {
    a.position
        .cmp(&b.position)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
