//! In-memory implementation of [`PlannerStore`].
//!
//! Holds everything in a `RefCell`, so it is single-threaded like the
//! collections that use it. `set_unavailable` makes every call fail, which is
//! how tests exercise the error paths of the collections.

use crate::error::{Error, Result};
use crate::planner::id::generate_id;
use crate::planner::models::{AuditEntry, Attachment, Project, Settings, Status, Tag, Task};
use crate::planner::store::{
    by_position, NewAttachment, NewProject, NewTag, NewTask, PlannerStore, PositionUpdate,
    ProjectUpdate, SettingsUpdate, TagUpdate, TaskUpdate,
};
use chrono::Utc;
use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    attachments: Vec<Attachment>,
    settings: Settings,
    audit: Vec<AuditEntry>,
}

impl Tables {
    fn audit(&mut self, operation: &str, entity: &str, entity_id: Option<&str>) {
        let id = i64::try_from(self.audit.len()).unwrap_or(i64::MAX) + 1;
        self.audit.push(AuditEntry {
            id,
            timestamp: Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            entity: entity.to_string(),
            entity_id: entity_id.map(str::to_string),
            details: None,
        });
    }

    fn sorted_tasks(&self, keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.iter().filter(|t| keep(t)).cloned().collect();
        tasks.sort_by(by_position);
        tasks
    }
}

/// In-memory planner store with the same contract as [`super::sqlite::SqliteStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RefCell<Tables>,
    unavailable: Cell<bool>,
}

impl InMemoryStore {
    /// Create an empty store with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a storage error (or stop failing).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.get() {
            return Err(Error::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl PlannerStore for InMemoryStore {
    fn create_project(&self, project: NewProject) -> Result<String> {
        self.check()?;
        let now = Utc::now();
        let id = generate_id("project", &project.name);
        let mut tables = self.tables.borrow_mut();
        tables.projects.push(Project {
            id: id.clone(),
            name: project.name,
            description: project.description,
            color: project.color,
            icon: project.icon,
            archived: project.archived,
            created_at: now,
            updated_at: now,
        });
        tables.audit("create", "project", Some(&id));
        Ok(id)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.check()?;
        Ok(self.tables.borrow().projects.iter().filter(|p| !p.archived).cloned().collect())
    }

    fn list_archived_projects(&self) -> Result<Vec<Project>> {
        self.check()?;
        Ok(self.tables.borrow().projects.iter().filter(|p| p.archived).cloned().collect())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.check()?;
        Ok(self.tables.borrow().projects.iter().find(|p| p.id == id).cloned())
    }

    fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if !update.is_empty() {
            update.apply(project, Utc::now());
            tables.audit("update", "project", Some(id));
        }
        Ok(true)
    }

    fn delete_project(&self, id: &str) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        tables.tasks.retain(|t| t.project_id != id);
        let found = tables.projects.len() < before;
        if found {
            tables.audit("delete", "project", Some(id));
        }
        Ok(found)
    }

    fn archive_project(&self, id: &str) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        ProjectUpdate { archived: Some(true), ..Default::default() }.apply(project, Utc::now());
        tables.audit("archive", "project", Some(id));
        Ok(true)
    }

    fn create_task(&self, task: NewTask) -> Result<String> {
        self.check()?;
        let now = Utc::now();
        let id = generate_id("task", &task.title);
        let mut tables = self.tables.borrow_mut();
        tables.tasks.push(Task {
            id: id.clone(),
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            tags: task.tags,
            assigned_to: task.assigned_to,
            completed_at: None,
            position: task.position,
            created_at: now,
            updated_at: now,
        });
        tables.audit("create", "task", Some(&id));
        Ok(id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.check()?;
        Ok(self.tables.borrow().sorted_tasks(|_| true))
    }

    fn tasks_by_project(&self, project_id: &str) -> Result<Vec<Task>> {
        self.check()?;
        Ok(self.tables.borrow().sorted_tasks(|t| t.project_id == project_id))
    }

    fn tasks_by_status(&self, status: Status) -> Result<Vec<Task>> {
        self.check()?;
        Ok(self.tables.borrow().sorted_tasks(|t| t.status == status))
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.check()?;
        Ok(self.tables.borrow().tasks.iter().find(|t| t.id == id).cloned())
    }

    fn update_task(&self, id: &str, update: TaskUpdate) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if !update.is_empty() {
            update.apply(task, Utc::now());
            tables.audit("update", "task", Some(id));
        }
        Ok(true)
    }

    fn delete_task(&self, id: &str) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        let found = tables.tasks.len() < before;
        if found {
            tables.audit("delete", "task", Some(id));
        }
        Ok(found)
    }

    fn update_task_position(&self, id: &str, position: u32) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.position = position;
        task.updated_at = Utc::now();
        tables.audit("move", "task", Some(id));
        Ok(true)
    }

    fn set_task_positions(&self, positions: &[PositionUpdate]) -> Result<usize> {
        self.check()?;
        let now = Utc::now();
        let mut tables = self.tables.borrow_mut();
        let mut found = 0;
        for update in positions {
            if let Some(task) = tables.tasks.iter_mut().find(|t| t.id == update.task_id) {
                task.position = update.position;
                task.updated_at = now;
                found += 1;
            }
        }
        if !positions.is_empty() {
            tables.audit("renumber", "task", None);
        }
        Ok(found)
    }

    fn create_tag(&self, tag: NewTag) -> Result<String> {
        self.check()?;
        let id = generate_id("tag", &tag.name);
        let mut tables = self.tables.borrow_mut();
        tables.tags.push(Tag {
            id: id.clone(),
            name: tag.name,
            color: tag.color,
            created_at: Utc::now(),
        });
        tables.audit("create", "tag", Some(&id));
        Ok(id)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        self.check()?;
        let mut tags = self.tables.borrow().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(tags)
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        self.check()?;
        Ok(self.tables.borrow().tags.iter().find(|t| t.id == id).cloned())
    }

    fn update_tag(&self, id: &str, update: TagUpdate) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let Some(tag) = tables.tags.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if update.is_empty() {
            return Ok(true);
        }
        if let Some(name) = update.name {
            tag.name = name;
        }
        if let Some(color) = update.color {
            tag.color = color;
        }
        tables.audit("update", "tag", Some(id));
        Ok(true)
    }

    fn delete_tag(&self, id: &str) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let before = tables.tags.len();
        tables.tags.retain(|t| t.id != id);
        let found = tables.tags.len() < before;
        if found {
            tables.audit("delete", "tag", Some(id));
        }
        Ok(found)
    }

    fn settings(&self) -> Result<Settings> {
        self.check()?;
        Ok(self.tables.borrow().settings.clone())
    }

    fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        update.apply(&mut tables.settings);
        tables.audit("update", "settings", Some("default"));
        Ok(tables.settings.clone())
    }

    fn create_attachment(&self, attachment: NewAttachment) -> Result<String> {
        self.check()?;
        let id = generate_id("attachment", &attachment.name);
        let mut tables = self.tables.borrow_mut();
        tables.attachments.push(Attachment {
            id: id.clone(),
            name: attachment.name,
            mime_type: attachment.mime_type,
            data: attachment.data,
            size: attachment.size,
            created_at: Utc::now(),
        });
        tables.audit("create", "attachment", Some(&id));
        Ok(id)
    }

    fn get_attachment(&self, id: &str) -> Result<Option<Attachment>> {
        self.check()?;
        Ok(self.tables.borrow().attachments.iter().find(|a| a.id == id).cloned())
    }

    fn delete_attachment(&self, id: &str) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let before = tables.attachments.len();
        tables.attachments.retain(|a| a.id != id);
        let found = tables.attachments.len() < before;
        if found {
            tables.audit("delete", "attachment", Some(id));
        }
        Ok(found)
    }

    fn audit_log(
        &self,
        entity_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEntry>> {
        self.check()?;
        Ok(self
            .tables
            .borrow()
            .audit
            .iter()
            .rev()
            .filter(|e| entity_id.is_none() || e.entity_id.as_deref() == entity_id)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}
