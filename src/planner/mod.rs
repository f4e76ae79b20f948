//! Project and task planning.
//!
//! This module provides:
//! - Projects that own tasks, with archiving and cascading delete
//! - Tasks with status, priority, due dates, tags and a board position
//! - A kanban board derived from the task list, with move planning and repair
//! - Collections that cache store contents and reload after every write
//! - Audit logging for all store writes
//!
//! # Example
//!
//! ```no_run
//! use work_planner::planner::{
//!     CollectionOptions, NewProject, NewTask, PlannerStore, SqliteStore, Status, TaskCollection,
//! };
//!
//! let store = SqliteStore::new("/tmp/planner.sqlite3").unwrap();
//! let project = store.create_project(NewProject::named("Home")).unwrap();
//!
//! let options = CollectionOptions::default();
//! let mut tasks = TaskCollection::new(&store, Some(project.as_str()), options);
//! let id = tasks.create_task(NewTask::new(&project, "Paint the fence")).unwrap();
//! tasks.move_task(&id, Status::Done, 0).unwrap();
//! ```

pub mod board;
pub mod collection;
pub mod id;
pub mod memory;
pub mod models;
pub mod sqlite;
pub mod stats;
pub mod store;
pub mod validation;

pub use board::{Board, BoardError, Column, MovePlan};
pub use collection::{CollectionOptions, ProjectCollection, TagCollection, TaskCollection};
pub use memory::InMemoryStore;
pub use models::{
    Attachment, AuditEntry, DefaultView, InvalidPriority, InvalidSetting, InvalidStatus, Priority,
    Project, Settings, Status, Tag, Task, Theme,
};
pub use sqlite::SqliteStore;
pub use store::{
    NewAttachment, NewProject, NewTag, NewTask, PlannerStore, PositionUpdate, ProjectUpdate,
    SettingsUpdate, TagUpdate, TaskUpdate,
};
pub use validation::{FieldError, ValidationErrors, Violation};
