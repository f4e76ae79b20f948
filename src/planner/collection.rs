//! Entity collections: cached views of the store that reload after every write.
//!
//! Each collection owns its items, a loading flag and an error slot. A
//! mutation validates its input, calls the store once, and on success reloads
//! the whole collection. On failure the previous items stay in place and the
//! error slot holds a localized message; the error is also returned.

use crate::config::{Locale, PlannerConfig};
use crate::error::{Error, Result};
use crate::event_log::EventLog;
use crate::messages::{self, Action, Subject};
use crate::planner::board::{Board, MovePlan};
use crate::planner::models::{Project, Status, Tag, Task};
use crate::planner::store::{
    NewProject, NewTag, NewTask, PlannerStore, ProjectUpdate, TagUpdate, TaskUpdate,
};
use crate::planner::validation;
use chrono::{DateTime, Utc};
use std::path::Path;

/// How collections report failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionOptions {
    /// Language of error slot messages.
    pub locale: Locale,
    /// Where mutation events are logged.
    pub events: EventLog,
}

impl CollectionOptions {
    /// Options for the given config and database.
    #[must_use]
    pub fn from_config(config: &PlannerConfig, db_path: &Path) -> Self {
        Self { locale: config.locale, events: EventLog::for_database(config, db_path) }
    }
}

struct State<'a, S: ?Sized, T> {
    store: &'a S,
    options: CollectionOptions,
    subject: Subject,
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
}

impl<'a, S: PlannerStore + ?Sized, T> State<'a, S, T> {
    const fn new(store: &'a S, options: CollectionOptions, subject: Subject) -> Self {
        Self { store, options, subject, items: Vec::new(), loading: true, error: None }
    }

    fn load(&mut self, fetch: impl FnOnce(&S) -> Result<Vec<T>>) -> Result<()> {
        self.loading = true;
        let loaded = match fetch(self.store) {
            Ok(items) => {
                self.items = items;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.fail(Action::Load, None, err)),
        };
        self.loading = false;
        loaded
    }

    fn succeeded(&self, action: Action, id: &str) {
        self.options.events.record(action.as_str(), self.subject.as_str(), Some(id), "");
    }

    /// Put the error in the slot and hand it back to the caller.
    fn fail(&mut self, action: Action, id: Option<&str>, err: Error) -> Error {
        let locale = self.options.locale;
        let message = match &err {
            Error::Validation(errors) => messages::validation_failed(locale, errors),
            other => messages::operation_failed(locale, action, self.subject, &other.to_string()),
        };
        let event = format!("{}_failed", action.as_str());
        self.options.events.record(&event, self.subject.as_str(), id, &message);
        self.error = Some(message);
        err
    }
}

macro_rules! collection_accessors {
    ($item:ty) => {
        /// Items from the last successful load.
        #[must_use]
        pub fn items(&self) -> &[$item] {
            &self.state.items
        }

        /// Whether a load is in progress.
        #[must_use]
        pub const fn is_loading(&self) -> bool {
            self.state.loading
        }

        /// Message from the last failure, cleared by the next successful load.
        #[must_use]
        pub fn error(&self) -> Option<&str> {
            self.state.error.as_deref()
        }
    };
}

/// Non-archived projects, oldest first.
pub struct ProjectCollection<'a, S: PlannerStore + ?Sized> {
    state: State<'a, S, Project>,
}

impl<'a, S: PlannerStore + ?Sized> ProjectCollection<'a, S> {
    /// Create the collection and load it.
    pub fn new(store: &'a S, options: CollectionOptions) -> Self {
        let mut collection = Self { state: State::new(store, options, Subject::Project) };
        collection.reload();
        collection
    }

    collection_accessors!(Project);

    /// Reload from the store.
    pub fn reload(&mut self) {
        let _ = self.state.load(S::list_projects);
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or bad color, or the store's error.
    pub fn create_project(&mut self, project: NewProject) -> Result<String> {
        let project = validation::prepare_new_project(project)
            .map_err(|e| self.state.fail(Action::Create, None, e.into()))?;
        let id = self
            .state
            .store
            .create_project(project)
            .map_err(|e| self.state.fail(Action::Create, None, e))?;
        self.state.succeeded(Action::Create, &id);
        self.reload();
        Ok(id)
    }

    /// Update a project. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or bad color, or the store's error.
    pub fn update_project(&mut self, id: &str, update: ProjectUpdate) -> Result<bool> {
        let update = validation::prepare_project_update(update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e.into()))?;
        let found = self
            .state
            .store
            .update_project(id, update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e))?;
        self.state.succeeded(Action::Update, id);
        self.reload();
        Ok(found)
    }

    /// Delete a project and its tasks. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn delete_project(&mut self, id: &str) -> Result<bool> {
        let found = self
            .state
            .store
            .delete_project(id)
            .map_err(|e| self.state.fail(Action::Delete, Some(id), e))?;
        self.state.succeeded(Action::Delete, id);
        self.reload();
        Ok(found)
    }

    /// Archive a project, hiding it from this collection. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn archive_project(&mut self, id: &str) -> Result<bool> {
        let found = self
            .state
            .store
            .archive_project(id)
            .map_err(|e| self.state.fail(Action::Archive, Some(id), e))?;
        self.state.succeeded(Action::Archive, id);
        self.reload();
        Ok(found)
    }
}

/// Tasks, optionally scoped to one project, ordered by position.
pub struct TaskCollection<'a, S: PlannerStore + ?Sized> {
    state: State<'a, S, Task>,
    scope: Option<String>,
    columns: Vec<Status>,
}

impl<'a, S: PlannerStore + ?Sized> TaskCollection<'a, S> {
    /// Create the collection and load it. With a scope, only that project's
    /// tasks are loaded.
    pub fn new(store: &'a S, scope: Option<&str>, options: CollectionOptions) -> Self {
        let mut collection = Self {
            state: State::new(store, options, Subject::Task),
            scope: scope.map(str::to_string),
            columns: Status::ALL.to_vec(),
        };
        collection.reload();
        collection
    }

    /// Use a custom board column order (usually `Settings::board_columns`).
    #[must_use]
    pub fn with_columns(mut self, columns: Vec<Status>) -> Self {
        self.columns = columns;
        self
    }

    collection_accessors!(Task);

    /// The current scope.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Change the scope. A different scope drops the current items and loads afresh.
    pub fn set_scope(&mut self, scope: Option<&str>) {
        if self.scope.as_deref() == scope {
            return;
        }
        self.scope = scope.map(str::to_string);
        self.state.items.clear();
        self.reload();
    }

    /// Reload from the store.
    pub fn reload(&mut self) {
        let _ = self.refresh();
    }

    /// Reload, handing back the store's error. Positions are computed from
    /// the refreshed items so that writes made elsewhere are counted.
    fn refresh(&mut self) -> Result<()> {
        let scope = self.scope.clone();
        self.state.load(|store| match &scope {
            Some(project_id) => store.tasks_by_project(project_id),
            None => store.list_tasks(),
        })
    }

    /// The board for the loaded tasks.
    #[must_use]
    pub fn board(&self) -> Board {
        Board::with_columns(&self.state.items, &self.columns)
    }

    /// Loaded tasks with the given status, in position order.
    #[must_use]
    pub fn tasks_by_status(&self, status: Status) -> Vec<&Task> {
        let mut tasks: Vec<&Task> =
            self.state.items.iter().filter(|t| t.status == status).collect();
        tasks.sort_by(|a, b| crate::planner::store::by_position(a, b));
        tasks
    }

    /// Loaded tasks past their due date and not done.
    #[must_use]
    pub fn overdue_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.state.items.iter().filter(|t| t.is_overdue(now)).collect()
    }

    /// Create a task at the end of its status column.
    ///
    /// The collection is reloaded first; the position is then the number of
    /// its tasks with that status.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title or project, `NotFound` if the
    /// project does not exist, or the store's error.
    pub fn create_task(&mut self, mut task: NewTask) -> Result<String> {
        self.refresh()?;
        let count = self.state.items.iter().filter(|t| t.status == task.status).count();
        task.position = u32::try_from(count).unwrap_or(u32::MAX);
        self.create_task_with_position(task)
    }

    /// Create a task at the position it already carries.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`].
    pub fn create_task_with_position(&mut self, task: NewTask) -> Result<String> {
        let task = validation::prepare_new_task(task)
            .map_err(|e| self.state.fail(Action::Create, None, e.into()))?;
        let store = self.state.store;
        let project_exists = store
            .get_project(&task.project_id)
            .map_err(|e| self.state.fail(Action::Create, None, e))?
            .is_some();
        if !project_exists {
            let err = Error::not_found("project", task.project_id);
            return Err(self.state.fail(Action::Create, None, err));
        }
        let id = store.create_task(task).map_err(|e| self.state.fail(Action::Create, None, e))?;
        self.state.succeeded(Action::Create, &id);
        self.reload();
        Ok(id)
    }

    /// Update a task. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title or project, or the store's error.
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<bool> {
        let update = validation::prepare_task_update(update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e.into()))?;
        let found = self
            .state
            .store
            .update_task(id, update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e))?;
        self.state.succeeded(Action::Update, id);
        self.reload();
        Ok(found)
    }

    /// Delete a task. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let found = self
            .state
            .store
            .delete_task(id)
            .map_err(|e| self.state.fail(Action::Delete, Some(id), e))?;
        self.state.succeeded(Action::Delete, id);
        self.reload();
        Ok(found)
    }

    /// Set one task's position directly. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn update_task_position(&mut self, id: &str, position: u32) -> Result<bool> {
        let found = self
            .state
            .store
            .update_task_position(id, position)
            .map_err(|e| self.state.fail(Action::Move, Some(id), e))?;
        self.state.succeeded(Action::Move, id);
        self.reload();
        Ok(found)
    }

    /// Move a task to `to_index` in the `to` column and write the result.
    ///
    /// The move is planned against freshly loaded tasks. Moving to another
    /// column appends and ignores `to_index`. Returns the plan that was
    /// carried out; an unchanged plan writes nothing.
    ///
    /// # Errors
    ///
    /// Returns a board error if the move is impossible, or the store's error.
    pub fn move_task(&mut self, task_id: &str, to: Status, to_index: usize) -> Result<MovePlan> {
        self.refresh()?;
        let plan = self
            .board()
            .plan_move(task_id, to, to_index)
            .map_err(|e| self.state.fail(Action::Move, Some(task_id), e.into()))?;

        let store = self.state.store;
        let written = match &plan {
            MovePlan::Unchanged => return Ok(plan),
            MovePlan::ChangeStatus { task_id, to, position, .. } => {
                let update = TaskUpdate {
                    status: Some(*to),
                    position: Some(*position),
                    ..Default::default()
                };
                store.update_task(task_id, update).map(|_| ())
            }
            MovePlan::Reorder { positions, .. } => store.set_task_positions(positions).map(|_| ()),
        };
        written.map_err(|e| self.state.fail(Action::Move, Some(task_id), e))?;

        self.state.succeeded(Action::Move, task_id);
        self.reload();
        Ok(plan)
    }

    /// Renumber every column to contiguous positions. Returns how many tasks moved.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn repair_positions(&mut self) -> Result<usize> {
        self.refresh()?;
        let updates = self.board().plan_repair();
        if updates.is_empty() {
            return Ok(0);
        }
        let moved = self
            .state
            .store
            .set_task_positions(&updates)
            .map_err(|e| self.state.fail(Action::Repair, None, e))?;
        self.state.options.events.record(
            Action::Repair.as_str(),
            Subject::Task.as_str(),
            None,
            &format!("{moved} positions rewritten"),
        );
        self.reload();
        Ok(moved)
    }
}

/// Tags ordered by name.
pub struct TagCollection<'a, S: PlannerStore + ?Sized> {
    state: State<'a, S, Tag>,
}

impl<'a, S: PlannerStore + ?Sized> TagCollection<'a, S> {
    /// Create the collection and load it.
    pub fn new(store: &'a S, options: CollectionOptions) -> Self {
        let mut collection = Self { state: State::new(store, options, Subject::Tag) };
        collection.reload();
        collection
    }

    collection_accessors!(Tag);

    /// Reload from the store.
    pub fn reload(&mut self) {
        let _ = self.state.load(S::list_tags);
    }

    /// Create a tag.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or bad color, or the store's error.
    pub fn create_tag(&mut self, tag: NewTag) -> Result<String> {
        let tag = validation::prepare_new_tag(tag)
            .map_err(|e| self.state.fail(Action::Create, None, e.into()))?;
        let id =
            self.state.store.create_tag(tag).map_err(|e| self.state.fail(Action::Create, None, e))?;
        self.state.succeeded(Action::Create, &id);
        self.reload();
        Ok(id)
    }

    /// Update a tag. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or bad color, or the store's error.
    pub fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<bool> {
        let update = validation::prepare_tag_update(update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e.into()))?;
        let found = self
            .state
            .store
            .update_tag(id, update)
            .map_err(|e| self.state.fail(Action::Update, Some(id), e))?;
        self.state.succeeded(Action::Update, id);
        self.reload();
        Ok(found)
    }

    /// Delete a tag. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub fn delete_tag(&mut self, id: &str) -> Result<bool> {
        let found = self
            .state
            .store
            .delete_tag(id)
            .map_err(|e| self.state.fail(Action::Delete, Some(id), e))?;
        self.state.succeeded(Action::Delete, id);
        self.reload();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::memory::InMemoryStore;
    use chrono::Duration;
    use serial_test::serial;
    use tempfile::TempDir;

    fn options() -> CollectionOptions {
        CollectionOptions::default()
    }

    fn store_with_project() -> (InMemoryStore, String) {
        let store = InMemoryStore::new();
        let id = store.create_project(NewProject::named("Home")).unwrap();
        (store, id)
    }

    fn positions(tasks: &[&Task]) -> Vec<(String, u32)> {
        tasks.iter().map(|t| (t.title.clone(), t.position)).collect()
    }

    #[test]
    fn test_project_collection_loads_on_creation() {
        let (store, id) = store_with_project();
        let projects = ProjectCollection::new(&store, options());
        assert!(!projects.is_loading());
        assert_eq!(projects.error(), None);
        assert_eq!(projects.items().len(), 1);
        assert_eq!(projects.items()[0].id, id);
    }

    #[test]
    fn test_project_mutations_reload() {
        let store = InMemoryStore::new();
        let mut projects = ProjectCollection::new(&store, options());

        let a = projects.create_project(NewProject::named("A")).unwrap();
        let b = projects.create_project(NewProject::named("B")).unwrap();
        assert_eq!(projects.items().len(), 2);

        let rename = ProjectUpdate { name: Some("A2".to_string()), ..Default::default() };
        projects.update_project(&a, rename).unwrap();
        assert_eq!(projects.items()[0].name, "A2");

        assert!(projects.archive_project(&b).unwrap());
        assert_eq!(projects.items().len(), 1);
        assert!(store.get_project(&b).unwrap().unwrap().archived);

        assert!(projects.delete_project(&a).unwrap());
        assert!(projects.items().is_empty());
        assert!(!projects.delete_project(&a).unwrap());
    }

    #[test]
    fn test_delete_project_removes_its_tasks() {
        let (store, project) = store_with_project();
        let other = store.create_project(NewProject::named("Other")).unwrap();
        let mut tasks = TaskCollection::new(&store, None, options());
        tasks.create_task(NewTask::new(&project, "A")).unwrap();
        tasks.create_task(NewTask::new(&other, "B")).unwrap();

        let mut projects = ProjectCollection::new(&store, options());
        projects.delete_project(&project).unwrap();

        tasks.reload();
        assert_eq!(tasks.items().len(), 1);
        assert_eq!(tasks.items()[0].title, "B");
    }

    #[test]
    #[serial]
    fn test_store_failure_keeps_stale_items() {
        let (store, _) = store_with_project();
        let mut projects = ProjectCollection::new(&store, options());

        store.set_unavailable(true);
        let err = projects.create_project(NewProject::named("Nope")).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(projects.items().len(), 1);
        assert_eq!(
            projects.error(),
            Some("Failed to create project: Storage error: store unavailable")
        );

        projects.reload();
        assert_eq!(projects.items().len(), 1);
        assert_eq!(
            projects.error(),
            Some("Failed to load projects: Storage error: store unavailable")
        );

        store.set_unavailable(false);
        projects.reload();
        assert_eq!(projects.error(), None);
    }

    #[test]
    #[serial]
    fn test_german_error_messages() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let opts = CollectionOptions { locale: Locale::De, ..Default::default() };

        let tasks = TaskCollection::new(&store, None, opts.clone());
        assert_eq!(
            tasks.error(),
            Some("Fehler beim Laden der Aufgaben: Storage error: store unavailable")
        );

        store.set_unavailable(false);
        let mut tags = TagCollection::new(&store, opts);
        let err = tags.create_tag(NewTag { name: String::new(), color: "#fff".to_string() });
        assert!(matches!(err, Err(Error::Validation(_))));
        assert_eq!(
            tags.error(),
            Some("Name ist erforderlich; Farbe muss eine Farbe im Format #RRGGBB sein")
        );
    }

    #[test]
    fn test_validation_failure_makes_no_write() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());

        let err = tasks.create_task(NewTask::new(&project, "   ")).unwrap_err();
        let Error::Validation(errors) = err else {
            panic!("expected a validation error");
        };
        assert!(errors.has("title"));
        assert!(tasks.error().is_some());
        assert!(store.list_tasks().unwrap().is_empty());
        assert!(store.audit_log(None, None).unwrap().iter().all(|e| e.entity != "task"));
    }

    #[test]
    fn test_create_task_requires_existing_project() {
        let store = InMemoryStore::new();
        let mut tasks = TaskCollection::new(&store, None, options());
        let err = tasks.create_task(NewTask::new("ghost", "A")).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "project", .. }));
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_create_task_appends_to_status() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());

        tasks.create_task(NewTask::new(&project, "A")).unwrap();
        tasks.create_task(NewTask::new(&project, "B")).unwrap();
        tasks
            .create_task(NewTask { status: Status::Review, ..NewTask::new(&project, "R") })
            .unwrap();

        assert_eq!(
            positions(&tasks.tasks_by_status(Status::Todo)),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
        assert_eq!(positions(&tasks.tasks_by_status(Status::Review)), vec![("R".to_string(), 0)]);
    }

    #[test]
    fn test_explicit_position_is_kept() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        tasks
            .create_task_with_position(NewTask { position: 7, ..NewTask::new(&project, "A") })
            .unwrap();
        assert_eq!(tasks.items()[0].position, 7);
    }

    #[test]
    fn test_scope_filters_and_switches() {
        let (store, home) = store_with_project();
        let work = store.create_project(NewProject::named("Work")).unwrap();
        store.create_task(NewTask::new(&home, "H")).unwrap();
        store.create_task(NewTask::new(&work, "W")).unwrap();

        let mut tasks = TaskCollection::new(&store, Some(home.as_str()), options());
        assert_eq!(tasks.scope(), Some(home.as_str()));
        assert_eq!(tasks.items().len(), 1);
        assert_eq!(tasks.items()[0].title, "H");

        tasks.set_scope(Some(work.as_str()));
        assert_eq!(tasks.items().len(), 1);
        assert_eq!(tasks.items()[0].title, "W");

        tasks.set_scope(None);
        assert_eq!(tasks.items().len(), 2);
    }

    #[test]
    fn test_scoped_create_counts_only_scope() {
        let (store, home) = store_with_project();
        let work = store.create_project(NewProject::named("Work")).unwrap();
        store.create_task(NewTask::new(&work, "W0")).unwrap();
        store.create_task(NewTask { position: 1, ..NewTask::new(&work, "W1") }).unwrap();

        let mut tasks = TaskCollection::new(&store, Some(home.as_str()), options());
        let id = tasks.create_task(NewTask::new(&home, "H")).unwrap();
        assert_eq!(store.get_task(&id).unwrap().unwrap().position, 0);
    }

    #[test]
    fn test_positions_count_writes_from_other_collections() {
        let (store, project) = store_with_project();
        let mut first = TaskCollection::new(&store, Some(project.as_str()), options());
        let mut second = TaskCollection::new(&store, Some(project.as_str()), options());

        let a = second.create_task(NewTask::new(&project, "A")).unwrap();
        let b = first.create_task(NewTask::new(&project, "B")).unwrap();
        assert_eq!(store.get_task(&b).unwrap().unwrap().position, 1);

        second.move_task(&a, Status::Done, 0).unwrap();
        let plan = first.move_task(&b, Status::Done, 0).unwrap();
        assert!(matches!(plan, MovePlan::ChangeStatus { position: 1, .. }));
        assert_eq!(store.get_task(&b).unwrap().unwrap().position, 1);
        assert_eq!(
            positions(&first.tasks_by_status(Status::Done)),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn test_create_fails_when_reload_fails() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        store.set_unavailable(true);
        assert!(matches!(
            tasks.create_task(NewTask::new(&project, "A")),
            Err(Error::Storage(_))
        ));
        store.set_unavailable(false);
        assert!(store.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_move_across_statuses() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, Some(project.as_str()), options());
        let a = tasks.create_task(NewTask::new(&project, "A")).unwrap();
        let b = tasks.create_task(NewTask::new(&project, "B")).unwrap();

        let plan = tasks.move_task(&b, Status::Done, 5).unwrap();
        assert!(matches!(plan, MovePlan::ChangeStatus { position: 0, .. }));

        let moved = store.get_task(&b).unwrap().unwrap();
        assert_eq!(moved.status, Status::Done);
        assert_eq!(moved.position, 0);
        assert!(moved.completed_at.is_some());

        let untouched = store.get_task(&a).unwrap().unwrap();
        assert_eq!((untouched.status, untouched.position), (Status::Todo, 0));
        assert_eq!(tasks.tasks_by_status(Status::Done).len(), 1);
    }

    #[test]
    fn test_move_within_status_renumbers() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        for title in ["A", "B", "C"] {
            tasks.create_task(NewTask::new(&project, title)).unwrap();
        }
        let c = tasks.items()[2].id.clone();

        tasks.move_task(&c, Status::Todo, 0).unwrap();
        assert_eq!(
            positions(&tasks.tasks_by_status(Status::Todo)),
            vec![("C".to_string(), 0), ("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn test_noop_move_writes_nothing() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        let a = tasks.create_task(NewTask::new(&project, "A")).unwrap();
        let before = store.audit_log(None, None).unwrap().len();

        assert!(tasks.move_task(&a, Status::Todo, 0).unwrap().is_noop());
        assert_eq!(store.audit_log(None, None).unwrap().len(), before);
    }

    #[test]
    fn test_bad_move_sets_error() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        let a = tasks.create_task(NewTask::new(&project, "A")).unwrap();

        assert!(matches!(tasks.move_task(&a, Status::Todo, 3), Err(Error::Board(_))));
        assert!(tasks.error().is_some());
        assert!(matches!(tasks.move_task("nope", Status::Done, 0), Err(Error::Board(_))));
    }

    #[test]
    fn test_repair_positions() {
        let (store, project) = store_with_project();
        store.create_task(NewTask { position: 4, ..NewTask::new(&project, "A") }).unwrap();
        store.create_task(NewTask { position: 9, ..NewTask::new(&project, "B") }).unwrap();
        store.create_task(NewTask { status: Status::Done, ..NewTask::new(&project, "D") }).unwrap();

        let mut tasks = TaskCollection::new(&store, None, options());
        assert_eq!(tasks.repair_positions().unwrap(), 2);
        assert_eq!(
            positions(&tasks.tasks_by_status(Status::Todo)),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
        assert_eq!(tasks.repair_positions().unwrap(), 0);
    }

    #[test]
    fn test_update_task_position() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        let a = tasks.create_task(NewTask::new(&project, "A")).unwrap();
        assert!(tasks.update_task_position(&a, 3).unwrap());
        assert_eq!(tasks.items()[0].position, 3);
        assert!(!tasks.update_task_position("missing", 1).unwrap());
    }

    #[test]
    fn test_update_and_delete_task() {
        let (store, project) = store_with_project();
        let mut tasks = TaskCollection::new(&store, None, options());
        let a = tasks.create_task(NewTask::new(&project, "A")).unwrap();

        let rename = TaskUpdate { title: Some(" Renamed ".to_string()), ..Default::default() };
        tasks.update_task(&a, rename).unwrap();
        assert_eq!(tasks.items()[0].title, "Renamed");

        assert!(tasks.delete_task(&a).unwrap());
        assert!(tasks.items().is_empty());
    }

    #[test]
    fn test_overdue_tasks() {
        let (store, project) = store_with_project();
        let now = Utc::now();
        let mut tasks = TaskCollection::new(&store, None, options());
        tasks
            .create_task(NewTask {
                due_date: Some(now - Duration::days(1)),
                ..NewTask::new(&project, "Late")
            })
            .unwrap();
        tasks
            .create_task(NewTask {
                due_date: Some(now - Duration::days(1)),
                status: Status::Done,
                ..NewTask::new(&project, "Late but done")
            })
            .unwrap();
        tasks
            .create_task(NewTask {
                due_date: Some(now + Duration::days(1)),
                ..NewTask::new(&project, "Soon")
            })
            .unwrap();

        let overdue = tasks.overdue_tasks(now);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "Late");
    }

    #[test]
    fn test_custom_columns_limit_board() {
        let (store, project) = store_with_project();
        store
            .create_task(NewTask { status: Status::Review, ..NewTask::new(&project, "R") })
            .unwrap();
        let tasks = TaskCollection::new(&store, None, options())
            .with_columns(vec![Status::Todo, Status::Done]);
        assert_eq!(tasks.board().columns().len(), 2);
        assert_eq!(tasks.board().locate(&tasks.items()[0].id), None);
    }

    #[test]
    fn test_tag_collection() {
        let store = InMemoryStore::new();
        let mut tags = TagCollection::new(&store, options());
        let tag =
            |name: &str, color: &str| NewTag { name: name.to_string(), color: color.to_string() };
        let z = tags.create_tag(tag("zeta", "#10B981")).unwrap();
        tags.create_tag(tag("alpha", "#F59E0B")).unwrap();

        let names: Vec<&str> = tags.items().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        tags.update_tag(&z, TagUpdate { name: Some("beta".to_string()), color: None }).unwrap();
        assert_eq!(tags.items()[1].name, "beta");

        assert!(tags.delete_tag(&z).unwrap());
        assert_eq!(tags.items().len(), 1);
    }

    #[test]
    fn test_events_are_logged() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("events.jsonl");
        let opts = CollectionOptions { events: EventLog::to_file(&log_path), ..Default::default() };

        let store = InMemoryStore::new();
        let mut projects = ProjectCollection::new(&store, opts);
        let id = projects.create_project(NewProject::named("Logged")).unwrap();
        let _ = projects.create_project(NewProject::named(""));

        let lines: Vec<serde_json::Value> = std::fs::read_to_string(&log_path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "create");
        assert_eq!(lines[0]["id"], id.as_str());
        assert_eq!(lines[1]["event"], "create_failed");
        assert_eq!(lines[1]["entity"], "project");
    }
}
