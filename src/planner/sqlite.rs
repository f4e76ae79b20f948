//! `SQLite` implementation of [`PlannerStore`].

use crate::error::Result;
use crate::planner::id::generate_id;
use crate::planner::models::{
    AuditEntry, Attachment, DefaultView, Priority, Project, Settings, Status, Tag, Task, Theme,
};
use crate::planner::store::{
    NewAttachment, NewProject, NewTag, NewTask, PlannerStore, PositionUpdate, ProjectUpdate,
    SettingsUpdate, TagUpdate, TaskUpdate,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::{Path, PathBuf};

const PROJECT_COLUMNS: &str =
    "id, name, description, color, icon, archived, created_at, updated_at";

const TASK_COLUMNS: &str = "id, project_id, title, description, status, priority, due_date, \
     tags, assigned_to, completed_at, position, created_at, updated_at";

/// Row ID of the settings singleton.
const SETTINGS_ID: &str = "default";

/// SQLite-based planner store.
///
/// Each operation opens its own connection, so the store is cheap to clone
/// and several processes can share one database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a new `SQLite` store at the given database path.
    ///
    /// Creates the schema and the default settings row if they are missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                color TEXT NOT NULL,
                icon TEXT,
                archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- project_id is checked by callers on create, not by a foreign key
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'todo'
                    CHECK (status IN ('todo', 'in-progress', 'review', 'done')),
                priority TEXT NOT NULL DEFAULT 'medium'
                    CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
                due_date TEXT,
                tags TEXT NOT NULL DEFAULT '[]',
                assigned_to TEXT,
                completed_at TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS attachments (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                data TEXT NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                id TEXT PRIMARY KEY,
                theme TEXT NOT NULL,
                default_view TEXT NOT NULL,
                board_columns TEXT NOT NULL,
                notifications INTEGER NOT NULL,
                auto_save INTEGER NOT NULL
            );

            -- Immutable audit log
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                operation TEXT NOT NULL,
                entity TEXT NOT NULL,
                entity_id TEXT,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_projects_archived ON projects(archived, created_at);
            CREATE INDEX IF NOT EXISTS idx_tasks_project_status_position
                ON tasks(project_id, status, position);
            CREATE INDEX IF NOT EXISTS idx_tasks_status_position ON tasks(status, position);
            CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name);
            CREATE INDEX IF NOT EXISTS idx_audit_entity_id ON audit_log(entity_id);
            ",
        )?;

        let defaults = Settings::default();
        conn.execute(
            "INSERT OR IGNORE INTO settings
                 (id, theme, default_view, board_columns, notifications, auto_save)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                SETTINGS_ID,
                defaults.theme.as_str(),
                defaults.default_view.as_str(),
                serde_json::to_string(&defaults.board_columns)?,
                defaults.notifications,
                defaults.auto_save,
            ],
        )?;

        Ok(())
    }

    /// Log an operation to the audit log.
    fn log_audit(
        conn: &Connection,
        operation: &str,
        entity: &str,
        entity_id: Option<&str>,
        details: Option<&str>,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO audit_log (timestamp, operation, entity, entity_id, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![format_ts(Utc::now()), operation, entity, entity_id, details],
        )?;
        Ok(())
    }

    /// Parse a project from a row selected with `PROJECT_COLUMNS`.
    fn parse_project(row: &Row) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            color: row.get(3)?,
            icon: row.get(4)?,
            archived: row.get(5)?,
            created_at: read_ts(row, 6)?,
            updated_at: read_ts(row, 7)?,
        })
    }

    /// Parse a task from a row selected with `TASK_COLUMNS`.
    fn parse_task(row: &Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(4)?;
        let priority_str: String = row.get(5)?;
        let tags_json: String = row.get(7)?;

        Ok(Task {
            id: row.get(0)?,
            project_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: Status::from_str(&status_str).unwrap_or_default(),
            priority: Priority::from_str(&priority_str).unwrap_or_default(),
            due_date: read_opt_ts(row, 6)?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            assigned_to: row.get(8)?,
            completed_at: read_opt_ts(row, 9)?,
            position: row.get(10)?,
            created_at: read_ts(row, 11)?,
            updated_at: read_ts(row, 12)?,
        })
    }

    fn parse_tag(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            created_at: read_ts(row, 3)?,
        })
    }

    fn query_projects(&self, archived: bool) -> Result<Vec<Project>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE archived = ?1
             ORDER BY created_at ASC, id ASC"
        ))?;
        let projects = stmt
            .query_map(params![archived], Self::parse_project)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    fn query_tasks(&self, where_clause: &str, param: Option<&str>) -> Result<Vec<Task>> {
        let conn = self.open()?;
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_clause}
             ORDER BY position ASC, created_at ASC, id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let tasks: rusqlite::Result<Vec<Task>> = match param {
            Some(value) => stmt.query_map(params![value], Self::parse_task)?.collect(),
            None => stmt.query_map([], Self::parse_task)?.collect(),
        };
        Ok(tasks?)
    }
}

impl PlannerStore for SqliteStore {
    fn create_project(&self, project: NewProject) -> Result<String> {
        let conn = self.open()?;
        let id = generate_id("project", &project.name);
        let now = format_ts(Utc::now());

        conn.execute(
            "INSERT INTO projects
                 (id, name, description, color, icon, archived, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                &id,
                project.name,
                project.description,
                project.color,
                project.icon,
                project.archived,
                now,
            ],
        )?;

        Self::log_audit(&conn, "create", "project", Some(&id), Some(&project.name))?;
        Ok(id)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.query_projects(false)
    }

    fn list_archived_projects(&self) -> Result<Vec<Project>> {
        self.query_projects(true)
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.open()?;
        let project = conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                Self::parse_project,
            )
            .optional()?;
        Ok(project)
    }

    fn update_project(&self, id: &str, update: ProjectUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.get_project(id)?.is_some());
        }

        let conn = self.open()?;

        // Build dynamic UPDATE statement
        let mut updates = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(format_ts(Utc::now()))];

        if let Some(name) = update.name {
            updates.push("name = ?");
            values.push(Box::new(name));
        }
        if let Some(description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description));
        }
        if let Some(color) = update.color {
            updates.push("color = ?");
            values.push(Box::new(color));
        }
        if let Some(icon) = update.icon {
            updates.push("icon = ?");
            values.push(Box::new(icon));
        }
        if let Some(archived) = update.archived {
            updates.push("archived = ?");
            values.push(Box::new(archived));
        }

        values.push(Box::new(id.to_string()));
        let sql = format!("UPDATE projects SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();
        let rows = conn.execute(&sql, params.as_slice())?;

        if rows > 0 {
            Self::log_audit(&conn, "update", "project", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn delete_project(&self, id: &str) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        let rows = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        // Runs even when the project row is gone so that orphans left behind
        // by an interrupted delete are cleaned up.
        let tasks = tx.execute("DELETE FROM tasks WHERE project_id = ?1", params![id])?;

        if rows > 0 {
            Self::log_audit(
                &tx,
                "delete",
                "project",
                Some(id),
                Some(&format!("cascaded tasks: {tasks}")),
            )?;
        }

        tx.commit()?;
        Ok(rows > 0)
    }

    fn archive_project(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE projects SET archived = 1, updated_at = ?1 WHERE id = ?2",
            params![format_ts(Utc::now()), id],
        )?;
        if rows > 0 {
            Self::log_audit(&conn, "archive", "project", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn create_task(&self, task: NewTask) -> Result<String> {
        let conn = self.open()?;
        let id = generate_id("task", &task.title);
        let now = format_ts(Utc::now());

        conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?11, ?11)"
            ),
            params![
                &id,
                task.project_id,
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(format_ts),
                serde_json::to_string(&task.tags)?,
                task.assigned_to,
                task.position,
                now,
            ],
        )?;

        Self::log_audit(
            &conn,
            "create",
            "task",
            Some(&id),
            Some(&format!("status: {}, position: {}", task.status, task.position)),
        )?;
        Ok(id)
    }

    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks("", None)
    }

    fn tasks_by_project(&self, project_id: &str) -> Result<Vec<Task>> {
        self.query_tasks("WHERE project_id = ?1", Some(project_id))
    }

    fn tasks_by_status(&self, status: Status) -> Result<Vec<Task>> {
        self.query_tasks("WHERE status = ?1", Some(status.as_str()))
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let conn = self.open()?;
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }

    fn update_task(&self, id: &str, update: TaskUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.get_task(id)?.is_some());
        }

        let conn = self.open()?;
        let now = format_ts(Utc::now());
        let completes = update.completes();

        // Build dynamic UPDATE statement
        let mut updates = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(now.clone())];

        if let Some(project_id) = update.project_id {
            updates.push("project_id = ?");
            values.push(Box::new(project_id));
        }
        if let Some(title) = update.title {
            updates.push("title = ?");
            values.push(Box::new(title));
        }
        if let Some(description) = update.description {
            updates.push("description = ?");
            values.push(Box::new(description));
        }
        if let Some(status) = update.status {
            updates.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(priority) = update.priority {
            updates.push("priority = ?");
            values.push(Box::new(priority.as_str()));
        }
        if let Some(due_date) = update.due_date {
            updates.push("due_date = ?");
            values.push(Box::new(due_date.map(format_ts)));
        }
        if let Some(tags) = update.tags {
            updates.push("tags = ?");
            values.push(Box::new(serde_json::to_string(&tags)?));
        }
        if let Some(assigned_to) = update.assigned_to {
            updates.push("assigned_to = ?");
            values.push(Box::new(assigned_to));
        }
        if let Some(completed_at) = update.completed_at {
            updates.push("completed_at = ?");
            values.push(Box::new(format_ts(completed_at)));
        } else if completes {
            updates.push("completed_at = COALESCE(completed_at, ?)");
            values.push(Box::new(now));
        }
        if let Some(position) = update.position {
            updates.push("position = ?");
            values.push(Box::new(position));
        }

        values.push(Box::new(id.to_string()));
        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();
        let rows = conn.execute(&sql, params.as_slice())?;

        if rows > 0 {
            Self::log_audit(&conn, "update", "task", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn delete_task(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if rows > 0 {
            Self::log_audit(&conn, "delete", "task", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn update_task_position(&self, id: &str, position: u32) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE tasks SET position = ?1, updated_at = ?2 WHERE id = ?3",
            params![position, format_ts(Utc::now()), id],
        )?;
        if rows > 0 {
            Self::log_audit(
                &conn,
                "move",
                "task",
                Some(id),
                Some(&format!("position: {position}")),
            )?;
        }
        Ok(rows > 0)
    }

    fn set_task_positions(&self, positions: &[PositionUpdate]) -> Result<usize> {
        if positions.is_empty() {
            return Ok(0);
        }

        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let now = format_ts(Utc::now());
        let mut found = 0;

        {
            let mut stmt =
                tx.prepare("UPDATE tasks SET position = ?1, updated_at = ?2 WHERE id = ?3")?;
            for update in positions {
                found += stmt.execute(params![update.position, &now, &update.task_id])?;
            }
        }

        Self::log_audit(
            &tx,
            "renumber",
            "task",
            None,
            Some(&format!("{found} of {} positions written", positions.len())),
        )?;
        tx.commit()?;
        Ok(found)
    }

    fn create_tag(&self, tag: NewTag) -> Result<String> {
        let conn = self.open()?;
        let id = generate_id("tag", &tag.name);
        conn.execute(
            "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![&id, tag.name, tag.color, format_ts(Utc::now())],
        )?;
        Self::log_audit(&conn, "create", "tag", Some(&id), Some(&tag.name))?;
        Ok(id)
    }

    fn list_tags(&self) -> Result<Vec<Tag>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT id, name, color, created_at FROM tags ORDER BY name ASC, id ASC")?;
        let tags = stmt.query_map([], Self::parse_tag)?.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn get_tag(&self, id: &str) -> Result<Option<Tag>> {
        let conn = self.open()?;
        let tag = conn
            .query_row(
                "SELECT id, name, color, created_at FROM tags WHERE id = ?1",
                params![id],
                Self::parse_tag,
            )
            .optional()?;
        Ok(tag)
    }

    fn update_tag(&self, id: &str, update: TagUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.get_tag(id)?.is_some());
        }

        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE tags SET name = COALESCE(?1, name), color = COALESCE(?2, color)
             WHERE id = ?3",
            params![update.name, update.color, id],
        )?;
        if rows > 0 {
            Self::log_audit(&conn, "update", "tag", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn delete_tag(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        if rows > 0 {
            Self::log_audit(&conn, "delete", "tag", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn settings(&self) -> Result<Settings> {
        let conn = self.open()?;
        let settings = conn.query_row(
            "SELECT theme, default_view, board_columns, notifications, auto_save
             FROM settings WHERE id = ?1",
            params![SETTINGS_ID],
            |row| {
                let theme: String = row.get(0)?;
                let default_view: String = row.get(1)?;
                let columns: String = row.get(2)?;
                Ok(Settings {
                    theme: Theme::from_str(&theme).unwrap_or_default(),
                    default_view: DefaultView::from_str(&default_view).unwrap_or_default(),
                    board_columns: serde_json::from_str(&columns)
                        .unwrap_or_else(|_| Status::ALL.to_vec()),
                    notifications: row.get(3)?,
                    auto_save: row.get(4)?,
                })
            },
        )?;
        Ok(settings)
    }

    fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.settings()?;
        update.apply(&mut settings);

        let conn = self.open()?;
        conn.execute(
            "UPDATE settings SET theme = ?1, default_view = ?2, board_columns = ?3,
                 notifications = ?4, auto_save = ?5
             WHERE id = ?6",
            params![
                settings.theme.as_str(),
                settings.default_view.as_str(),
                serde_json::to_string(&settings.board_columns)?,
                settings.notifications,
                settings.auto_save,
                SETTINGS_ID,
            ],
        )?;
        Self::log_audit(&conn, "update", "settings", Some(SETTINGS_ID), None)?;
        Ok(settings)
    }

    fn create_attachment(&self, attachment: NewAttachment) -> Result<String> {
        let conn = self.open()?;
        let id = generate_id("attachment", &attachment.name);
        conn.execute(
            "INSERT INTO attachments (id, name, mime_type, data, size, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &id,
                attachment.name,
                attachment.mime_type,
                attachment.data,
                i64::try_from(attachment.size).unwrap_or(i64::MAX),
                format_ts(Utc::now()),
            ],
        )?;
        Self::log_audit(&conn, "create", "attachment", Some(&id), None)?;
        Ok(id)
    }

    fn get_attachment(&self, id: &str) -> Result<Option<Attachment>> {
        let conn = self.open()?;
        let attachment = conn
            .query_row(
                "SELECT id, name, mime_type, data, size, created_at FROM attachments
                 WHERE id = ?1",
                params![id],
                |row| {
                    let size: i64 = row.get(4)?;
                    Ok(Attachment {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        mime_type: row.get(2)?,
                        data: row.get(3)?,
                        size: u64::try_from(size).unwrap_or(0),
                        created_at: read_ts(row, 5)?,
                    })
                },
            )
            .optional()?;
        Ok(attachment)
    }

    fn delete_attachment(&self, id: &str) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM attachments WHERE id = ?1", params![id])?;
        if rows > 0 {
            Self::log_audit(&conn, "delete", "attachment", Some(id), None)?;
        }
        Ok(rows > 0)
    }

    fn audit_log(
        &self,
        entity_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<AuditEntry>> {
        let conn = self.open()?;
        let limit = limit.map_or(-1, |lim| i64::try_from(lim).unwrap_or(i64::MAX));

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, operation, entity, entity_id, details FROM audit_log
             WHERE ?1 IS NULL OR entity_id = ?1
             ORDER BY id DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![entity_id, limit], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    operation: row.get(2)?,
                    entity: row.get(3)?,
                    entity_id: row.get(4)?,
                    details: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_ts(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_ts(idx, &text)
}

fn read_opt_ts(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_ts(idx, &t)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::id::{disable_deterministic_ids, enable_deterministic_ids};
    use chrono::TimeZone;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("planner.sqlite3");
        let store = SqliteStore::new(&db_path).unwrap();
        (dir, store)
    }

    fn add_task(
        store: &SqliteStore,
        project_id: &str,
        title: &str,
        status: Status,
        pos: u32,
    ) -> String {
        store
            .create_task(NewTask { status, position: pos, ..NewTask::new(project_id, title) })
            .unwrap()
    }

    #[test]
    #[serial]
    fn test_create_and_get_project() {
        enable_deterministic_ids();
        let (_dir, store) = create_test_store();

        let id = store
            .create_project(NewProject {
                description: Some("Kitchen and bath".to_string()),
                ..NewProject::named("Home Renovation")
            })
            .unwrap();
        assert_eq!(id, "home-renovation-00000000");

        let project = store.get_project(&id).unwrap().unwrap();
        assert_eq!(project.name, "Home Renovation");
        assert_eq!(project.description.as_deref(), Some("Kitchen and bath"));
        assert!(!project.archived);
        assert_eq!(project.created_at, project.updated_at);

        disable_deterministic_ids();
    }

    #[test]
    fn test_get_nonexistent_project() {
        let (_dir, store) = create_test_store();
        assert!(store.get_project("missing").unwrap().is_none());
        assert!(!store.update_project("missing", ProjectUpdate::default()).unwrap());
        assert!(!store.archive_project("missing").unwrap());
    }

    #[test]
    fn test_update_project_refreshes_updated_at() {
        let (_dir, store) = create_test_store();
        let id = store.create_project(NewProject::named("P1")).unwrap();
        let before = store.get_project(&id).unwrap().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let found = store
            .update_project(
                &id,
                ProjectUpdate { color: Some("#EF4444".to_string()), ..Default::default() },
            )
            .unwrap();
        assert!(found);

        let after = store.get_project(&id).unwrap().unwrap();
        assert_eq!(after.color, "#EF4444");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_archive_hides_project_from_listing() {
        let (_dir, store) = create_test_store();
        let keep = store.create_project(NewProject::named("Keep")).unwrap();
        let old = store.create_project(NewProject::named("Old")).unwrap();

        assert!(store.archive_project(&old).unwrap());

        let listed: Vec<String> =
            store.list_projects().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![keep]);

        let archived = store.list_archived_projects().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, old);
        assert!(store.get_project(&old).unwrap().unwrap().archived);
    }

    #[test]
    fn test_delete_project_cascades_to_tasks() {
        let (_dir, store) = create_test_store();
        let p1 = store.create_project(NewProject::named("P1")).unwrap();
        let p2 = store.create_project(NewProject::named("P2")).unwrap();
        add_task(&store, &p1, "A", Status::Todo, 0);
        add_task(&store, &p1, "B", Status::Done, 0);
        let other = add_task(&store, &p2, "C", Status::Todo, 0);

        assert!(store.delete_project(&p1).unwrap());

        assert!(store.get_project(&p1).unwrap().is_none());
        assert!(store.tasks_by_project(&p1).unwrap().is_empty());
        let remaining: Vec<String> =
            store.list_tasks().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![other]);
    }

    #[test]
    fn test_delete_missing_project_still_removes_orphans() {
        let (_dir, store) = create_test_store();
        add_task(&store, "ghost", "Orphan", Status::Todo, 0);

        assert!(!store.delete_project("ghost").unwrap());
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_tasks_ordered_by_position() {
        let (_dir, store) = create_test_store();
        let p = store.create_project(NewProject::named("P")).unwrap();
        let c = add_task(&store, &p, "C", Status::Todo, 2);
        let a = add_task(&store, &p, "A", Status::Todo, 0);
        let d = add_task(&store, &p, "D", Status::Done, 3);
        let b = add_task(&store, &p, "B", Status::Todo, 1);

        let todo: Vec<String> =
            store.tasks_by_status(Status::Todo).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(todo, vec![a.clone(), b.clone(), c.clone()]);

        let all: Vec<String> =
            store.tasks_by_project(&p).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(all, vec![a, b, c, d]);
    }

    #[test]
    fn test_create_task_round_trips_fields() {
        let (_dir, store) = create_test_store();
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let id = store
            .create_task(NewTask {
                description: Some("Check flights".to_string()),
                priority: Priority::Urgent,
                due_date: Some(due),
                tags: vec!["travel".to_string(), "admin".to_string()],
                assigned_to: Some("sam".to_string()),
                position: 3,
                ..NewTask::new("p", "Book trip")
            })
            .unwrap();

        let task = store.get_task(&id).unwrap().unwrap();
        assert_eq!(task.title, "Book trip");
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.tags, vec!["travel", "admin"]);
        assert_eq!(task.assigned_to.as_deref(), Some("sam"));
        assert_eq!(task.position, 3);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_update_task_to_done_sets_completed_at_once() {
        let (_dir, store) = create_test_store();
        let id = add_task(&store, "p", "Ship", Status::Review, 0);

        let done = TaskUpdate { status: Some(Status::Done), ..Default::default() };
        assert!(store.update_task(&id, done.clone()).unwrap());
        let first = store.get_task(&id).unwrap().unwrap().completed_at.unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        store.update_task(&id, done).unwrap();
        assert_eq!(store.get_task(&id).unwrap().unwrap().completed_at, Some(first));

        // Leaving done does not clear it.
        store
            .update_task(&id, TaskUpdate { status: Some(Status::Todo), ..Default::default() })
            .unwrap();
        let task = store.get_task(&id).unwrap().unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn test_update_task_status_and_position_together() {
        let (_dir, store) = create_test_store();
        let id = add_task(&store, "p", "Move me", Status::Todo, 4);

        store
            .update_task(
                &id,
                TaskUpdate {
                    status: Some(Status::InProgress),
                    position: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();

        let task = store.get_task(&id).unwrap().unwrap();
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.position, 0);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_update_missing_task() {
        let (_dir, store) = create_test_store();
        let update = TaskUpdate { title: Some("x".to_string()), ..Default::default() };
        assert!(!store.update_task("missing", update).unwrap());
        assert!(!store.update_task_position("missing", 1).unwrap());
        assert!(!store.delete_task("missing").unwrap());
    }

    #[test]
    fn test_set_task_positions_batch() {
        let (_dir, store) = create_test_store();
        let a = add_task(&store, "p", "A", Status::Todo, 0);
        let b = add_task(&store, "p", "B", Status::Todo, 1);

        let found = store
            .set_task_positions(&[
                PositionUpdate { task_id: a.clone(), position: 1 },
                PositionUpdate { task_id: b.clone(), position: 0 },
                PositionUpdate { task_id: "gone".to_string(), position: 2 },
            ])
            .unwrap();
        assert_eq!(found, 2);

        let order: Vec<String> =
            store.tasks_by_status(Status::Todo).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(order, vec![b, a]);
        assert_eq!(store.set_task_positions(&[]).unwrap(), 0);
    }

    #[test]
    fn test_tags_crud_and_ordering() {
        let (_dir, store) = create_test_store();
        let z = store
            .create_tag(NewTag { name: "zeta".to_string(), color: "#000000".to_string() })
            .unwrap();
        let a = store
            .create_tag(NewTag { name: "alpha".to_string(), color: "#FFFFFF".to_string() })
            .unwrap();

        let names: Vec<String> = store.list_tags().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        assert!(store
            .update_tag(&z, TagUpdate { color: Some("#111111".to_string()), ..Default::default() })
            .unwrap());
        let tag = store.get_tag(&z).unwrap().unwrap();
        assert_eq!(tag.name, "zeta");
        assert_eq!(tag.color, "#111111");

        assert!(store.delete_tag(&a).unwrap());
        assert!(store.get_tag(&a).unwrap().is_none());
    }

    #[test]
    fn test_deleting_tag_keeps_task_tag_names() {
        let (_dir, store) = create_test_store();
        let tag = store
            .create_tag(NewTag { name: "urgent".to_string(), color: "#EF4444".to_string() })
            .unwrap();
        let task = store
            .create_task(NewTask { tags: vec!["urgent".to_string()], ..NewTask::new("p", "T") })
            .unwrap();

        store.delete_tag(&tag).unwrap();
        assert_eq!(store.get_task(&task).unwrap().unwrap().tags, vec!["urgent"]);
    }

    #[test]
    fn test_settings_created_once_and_updated() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("planner.sqlite3");
        let store = SqliteStore::new(&db_path).unwrap();
        assert_eq!(store.settings().unwrap(), Settings::default());

        let updated = store
            .update_settings(SettingsUpdate {
                theme: Some(Theme::Dark),
                notifications: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.theme, Theme::Dark);

        // Re-opening must not reset the singleton.
        let reopened = SqliteStore::new(&db_path).unwrap();
        let settings = reopened.settings().unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.notifications);
        assert_eq!(settings.board_columns, Status::ALL.to_vec());
    }

    #[test]
    fn test_attachments() {
        let (_dir, store) = create_test_store();
        let id = store
            .create_attachment(NewAttachment {
                name: "notes.txt".to_string(),
                mime_type: "text/plain".to_string(),
                data: "aGVsbG8=".to_string(),
                size: 5,
            })
            .unwrap();

        let attachment = store.get_attachment(&id).unwrap().unwrap();
        assert_eq!(attachment.name, "notes.txt");
        assert_eq!(attachment.size, 5);

        assert!(store.delete_attachment(&id).unwrap());
        assert!(store.get_attachment(&id).unwrap().is_none());
    }

    #[test]
    fn test_audit_log() {
        let (_dir, store) = create_test_store();
        let p = store.create_project(NewProject::named("Audited")).unwrap();
        let t = add_task(&store, &p, "T", Status::Todo, 0);
        store.update_task_position(&t, 2).unwrap();
        store.delete_project(&p).unwrap();

        let all = store.audit_log(None, None).unwrap();
        assert!(all.len() >= 4);
        assert_eq!(all[0].operation, "delete");
        assert_eq!(all[0].entity, "project");

        let for_task = store.audit_log(Some(&t), None).unwrap();
        let ops: Vec<&str> = for_task.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["move", "create"]);

        assert_eq!(store.audit_log(None, Some(1)).unwrap().len(), 1);
    }
}
