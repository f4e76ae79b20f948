//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{BoardCommand, Command, ProjectCommand, SettingsCommand, TagCommand, TaskCommand};
use crate::config::{self, PlannerConfig};
use crate::error::Error;
use crate::planner::stats;
use crate::planner::{
    CollectionOptions, DefaultView, NewProject, NewTag, NewTask, PlannerStore, Priority,
    ProjectCollection, ProjectUpdate, SettingsUpdate, SqliteStore, Status, TagCollection,
    TagUpdate, Task, TaskCollection, TaskUpdate, Theme,
};
use crate::templates;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tera::Context;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

type CmdResult = Result<CliOutput, String>;

/// Run a CLI command against the config in the current directory.
pub fn run(command: Command) -> CliOutput {
    match std::env::current_dir() {
        Ok(cwd) => run_in(command, &cwd),
        Err(e) => error_output(format!("Cannot determine current directory: {e}")),
    }
}

/// Run a CLI command against the config in `base_dir`.
pub fn run_in(command: Command, base_dir: &Path) -> CliOutput {
    let result = match command {
        Command::Version => Ok(run_version()),
        Command::EnsureConfig => run_ensure_config(base_dir),
        Command::Project(cmd) => with_session(base_dir, |s| s.project(cmd)),
        Command::Task(cmd) => with_session(base_dir, |s| s.task(cmd)),
        Command::Tag(cmd) => with_session(base_dir, |s| s.tag(cmd)),
        Command::Board(cmd) => with_session(base_dir, |s| s.board(cmd)),
        Command::Settings(cmd) => with_session(base_dir, |s| s.settings(cmd)),
        Command::Dashboard { json } => with_session(base_dir, |s| s.dashboard(json)),
        Command::Calendar { from, to, project } => with_session(base_dir, |s| {
            s.calendar(from.as_deref(), to.as_deref(), project.as_deref())
        }),
        Command::AuditLog { id, limit } => {
            with_session(base_dir, |s| s.audit_log(id.as_deref(), limit))
        }
    };
    result.unwrap_or_else(error_output)
}

fn with_session(base_dir: &Path, command: impl FnOnce(&Session) -> CmdResult) -> CmdResult {
    let session = Session::open(base_dir)?;
    command(&session)
}

// === Utility Commands ===

fn run_version() -> CliOutput {
    CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![format!("work-planner v{}", crate::VERSION)],
    }
}

fn run_ensure_config(base_dir: &Path) -> CmdResult {
    let config =
        config::ensure_config_in(base_dir).map_err(|e| format!("Error ensuring config: {e}"))?;
    let database = config
        .database_path_in(base_dir)
        .map_or_else(|e| format!("(unavailable: {e})"), |p| p.display().to_string());
    Ok(CliOutput {
        exit_code: ExitCode::SUCCESS,
        stdout: vec![],
        stderr: vec![
            format!("Config ensured at {}", PlannerConfig::config_path(base_dir).display()),
            format!("  database: {database}"),
            format!("  locale: {}", config.locale),
            format!("  debug_logging: {}", config.debug_logging),
        ],
    })
}

/// An open database plus the options collections report with.
struct Session {
    store: SqliteStore,
    options: CollectionOptions,
}

impl Session {
    fn open(base_dir: &Path) -> Result<Self, String> {
        let config = PlannerConfig::load_from(base_dir)
            .map_err(|e| format!("Error loading config: {e}"))?
            .unwrap_or_default();
        if let Some(dir) = config.templates_dir_in(base_dir) {
            templates::init_templates(Some(&dir))
                .map_err(|e| format!("Error loading templates: {e}"))?;
        }
        let db_path = config.database_path_in(base_dir).map_err(|e| e.to_string())?;
        let store = SqliteStore::new(&db_path)
            .map_err(|e| format!("Error opening database {}: {e}", db_path.display()))?;
        Ok(Self { options: CollectionOptions::from_config(&config, &db_path), store })
    }

    // === Projects ===

    fn project(&self, cmd: ProjectCommand) -> CmdResult {
        let mut projects = ProjectCollection::new(&self.store, self.options.clone());
        match cmd {
            ProjectCommand::Create { name, description, color, icon } => {
                let mut project = NewProject::named(name);
                project.description = description;
                project.icon = icon;
                if let Some(color) = color {
                    project.color = color;
                }
                let id = projects
                    .create_project(project)
                    .map_err(|e| slot_message(&e, projects.error()))?;
                self.show_project(&id)
            }
            ProjectCommand::Get { id } => self.show_project(&id),
            ProjectCommand::Update { id, name, description, color, icon } => {
                let update = ProjectUpdate {
                    name,
                    description: description.map(Some),
                    color,
                    icon: icon.map(Some),
                    archived: None,
                };
                if update.is_empty() {
                    return Err("Nothing to update".to_string());
                }
                let found = projects
                    .update_project(&id, update)
                    .map_err(|e| slot_message(&e, projects.error()))?;
                require_found(found, "project", &id)?;
                self.show_project(&id)
            }
            ProjectCommand::Archive { id } => {
                let found = projects
                    .archive_project(&id)
                    .map_err(|e| slot_message(&e, projects.error()))?;
                require_found(found, "project", &id)?;
                Ok(success_output(format!("Archived project {id}")))
            }
            ProjectCommand::Delete { id } => {
                let found = projects
                    .delete_project(&id)
                    .map_err(|e| slot_message(&e, projects.error()))?;
                require_found(found, "project", &id)?;
                Ok(success_output(format!("Deleted project {id} and its tasks")))
            }
            ProjectCommand::List { archived } => {
                if archived {
                    let archived = self.store.list_archived_projects().map_err(to_message)?;
                    Ok(json_output(&archived))
                } else {
                    loaded(projects.error())?;
                    Ok(json_output(&projects.items()))
                }
            }
        }
    }

    fn show_project(&self, id: &str) -> CmdResult {
        let project = self
            .store
            .get_project(id)
            .map_err(to_message)?
            .ok_or_else(|| Error::not_found("project", id).to_string())?;
        Ok(json_output(&project))
    }

    // === Tasks ===

    fn task(&self, cmd: TaskCommand) -> CmdResult {
        match cmd {
            TaskCommand::Create {
                project,
                title,
                description,
                status,
                priority,
                due,
                tags,
                assignee,
                position,
            } => {
                let mut task = NewTask::new(project.clone(), title);
                task.description = description;
                task.status = Status::from_str(&status).map_err(|e| e.to_string())?;
                task.priority = Priority::from_str(&priority).map_err(|e| e.to_string())?;
                task.due_date = due.as_deref().map(parse_date).transpose()?;
                task.tags = tags;
                task.assigned_to = assignee;

                let mut tasks =
                    TaskCollection::new(&self.store, Some(project.as_str()), self.options.clone());
                let created = match position {
                    Some(position) => {
                        task.position = position;
                        tasks.create_task_with_position(task)
                    }
                    None => tasks.create_task(task),
                };
                let id = created.map_err(|e| slot_message(&e, tasks.error()))?;
                self.show_task(&id)
            }
            TaskCommand::Get { id } => self.show_task(&id),
            TaskCommand::Update {
                id,
                title,
                description,
                status,
                priority,
                due,
                clear_due,
                tags,
                assignee,
            } => {
                let due_date = if clear_due {
                    Some(None)
                } else {
                    due.as_deref().map(parse_date).transpose()?.map(Some)
                };
                let update = TaskUpdate {
                    title,
                    description: description.map(Some),
                    status: status.as_deref().map(parse_status).transpose()?,
                    priority: priority
                        .as_deref()
                        .map(Priority::from_str)
                        .transpose()
                        .map_err(|e| e.to_string())?,
                    due_date,
                    tags,
                    assigned_to: assignee.map(Some),
                    ..Default::default()
                };
                if update.is_empty() {
                    return Err("Nothing to update".to_string());
                }
                let mut tasks = TaskCollection::new(&self.store, None, self.options.clone());
                let found =
                    tasks.update_task(&id, update).map_err(|e| slot_message(&e, tasks.error()))?;
                require_found(found, "task", &id)?;
                self.show_task(&id)
            }
            TaskCommand::Move { id, status, index } => {
                let status = parse_status(&status)?;
                let task = self.find_task(&id)?;
                let scope = Some(task.project_id.as_str());
                let mut tasks = TaskCollection::new(&self.store, scope, self.options.clone());
                let plan = tasks
                    .move_task(&id, status, index)
                    .map_err(|e| slot_message(&e, tasks.error()))?;
                if plan.is_noop() {
                    return Ok(success_output(format!("Task {id} is already there")));
                }
                self.show_task(&id)
            }
            TaskCommand::Delete { id } => {
                let mut tasks = TaskCollection::new(&self.store, None, self.options.clone());
                let found = tasks.delete_task(&id).map_err(|e| slot_message(&e, tasks.error()))?;
                require_found(found, "task", &id)?;
                Ok(success_output(format!("Deleted task {id}")))
            }
            TaskCommand::List { project, status } => {
                let tasks =
                    TaskCollection::new(&self.store, project.as_deref(), self.options.clone());
                loaded(tasks.error())?;
                match status {
                    Some(status) => Ok(json_output(&tasks.tasks_by_status(parse_status(&status)?))),
                    None => Ok(json_output(&tasks.items())),
                }
            }
            TaskCommand::Overdue { project } => {
                let tasks =
                    TaskCollection::new(&self.store, project.as_deref(), self.options.clone());
                loaded(tasks.error())?;
                Ok(json_output(&tasks.overdue_tasks(Utc::now())))
            }
        }
    }

    fn find_task(&self, id: &str) -> Result<Task, String> {
        self.store
            .get_task(id)
            .map_err(to_message)?
            .ok_or_else(|| Error::not_found("task", id).to_string())
    }

    fn show_task(&self, id: &str) -> CmdResult {
        self.find_task(id).map(|task| json_output(&task))
    }

    // === Tags ===

    fn tag(&self, cmd: TagCommand) -> CmdResult {
        let mut tags = TagCollection::new(&self.store, self.options.clone());
        match cmd {
            TagCommand::Create { name, color } => {
                let id = tags
                    .create_tag(NewTag { name, color })
                    .map_err(|e| slot_message(&e, tags.error()))?;
                let tag = self.store.get_tag(&id).map_err(to_message)?;
                Ok(json_output(&tag))
            }
            TagCommand::Update { id, name, color } => {
                let update = TagUpdate { name, color };
                if update.is_empty() {
                    return Err("Nothing to update".to_string());
                }
                let found =
                    tags.update_tag(&id, update).map_err(|e| slot_message(&e, tags.error()))?;
                require_found(found, "tag", &id)?;
                let tag = self.store.get_tag(&id).map_err(to_message)?;
                Ok(json_output(&tag))
            }
            TagCommand::Delete { id } => {
                let found = tags.delete_tag(&id).map_err(|e| slot_message(&e, tags.error()))?;
                require_found(found, "tag", &id)?;
                Ok(success_output(format!("Deleted tag {id}")))
            }
            TagCommand::List => {
                loaded(tags.error())?;
                Ok(json_output(&tags.items()))
            }
        }
    }

    // === Board ===

    fn board(&self, cmd: BoardCommand) -> CmdResult {
        match cmd {
            BoardCommand::Show { project, json } => {
                let settings = self.store.settings().map_err(to_message)?;
                let tasks =
                    TaskCollection::new(&self.store, project.as_deref(), self.options.clone())
                        .with_columns(settings.board_columns);
                loaded(tasks.error())?;
                let board = tasks.board();
                if json {
                    return Ok(json_output(&board));
                }

                let now = Utc::now();
                let columns: Vec<BoardColumnView> = board
                    .columns()
                    .iter()
                    .map(|column| BoardColumnView {
                        label: column.status.label(),
                        tasks: column.tasks.iter().map(|t| BoardTaskView::new(t, now)).collect(),
                    })
                    .collect();
                let mut context = Context::new();
                context.insert("columns", &columns);
                let text = templates::render("views/board.tera", &context).map_err(to_message)?;
                Ok(success_output(text.trim_end().to_string()))
            }
            BoardCommand::Repair { project } => {
                self.store.get_project(&project).map_err(to_message)?.ok_or_else(|| {
                    Error::not_found("project", project.as_str()).to_string()
                })?;
                let mut tasks =
                    TaskCollection::new(&self.store, Some(project.as_str()), self.options.clone());
                let moved =
                    tasks.repair_positions().map_err(|e| slot_message(&e, tasks.error()))?;
                Ok(success_output(format!("Repaired {moved} task positions in {project}")))
            }
        }
    }

    // === Settings ===

    fn settings(&self, cmd: SettingsCommand) -> CmdResult {
        match cmd {
            SettingsCommand::Show => {
                let settings = self.store.settings().map_err(to_message)?;
                Ok(json_output(&settings))
            }
            SettingsCommand::Set { theme, default_view, columns, notifications, auto_save } => {
                let update = SettingsUpdate {
                    theme: theme
                        .as_deref()
                        .map(Theme::from_str)
                        .transpose()
                        .map_err(|e| e.to_string())?,
                    default_view: default_view
                        .as_deref()
                        .map(DefaultView::from_str)
                        .transpose()
                        .map_err(|e| e.to_string())?,
                    board_columns: columns
                        .map(|names| {
                            names
                                .iter()
                                .map(|name| parse_status(name.trim()))
                                .collect::<Result<Vec<_>, _>>()
                        })
                        .transpose()?,
                    notifications,
                    auto_save,
                };
                let settings = self.store.update_settings(update).map_err(to_message)?;
                Ok(json_output(&settings))
            }
        }
    }

    // === Views ===

    fn dashboard(&self, json: bool) -> CmdResult {
        let projects = ProjectCollection::new(&self.store, self.options.clone());
        loaded(projects.error())?;
        let tasks = TaskCollection::new(&self.store, None, self.options.clone());
        loaded(tasks.error())?;

        let summary = stats::dashboard(projects.items(), tasks.items(), Utc::now());
        if json {
            return Ok(json_output(&summary));
        }

        let mut context = Context::new();
        context.insert("total", &summary.total);
        context.insert(
            "by_status",
            &summary
                .by_status
                .iter()
                .map(|s| serde_json::json!({"label": s.status.label(), "count": s.count}))
                .collect::<Vec<_>>(),
        );
        context.insert(
            "overdue",
            &summary
                .overdue
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "title": t.title,
                        "due_date": t.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    })
                })
                .collect::<Vec<_>>(),
        );
        context.insert("recent", &summary.recent);
        context.insert("projects", &summary.projects);
        let text = templates::render("views/dashboard.tera", &context).map_err(to_message)?;
        Ok(success_output(text.trim_end().to_string()))
    }

    fn audit_log(&self, id: Option<&str>, limit: Option<usize>) -> CmdResult {
        let entries = self.store.audit_log(id, limit).map_err(to_message)?;
        Ok(json_output(&entries))
    }

    fn calendar(&self, from: Option<&str>, to: Option<&str>, project: Option<&str>) -> CmdResult {
        let from = from.map(parse_date).transpose()?;
        let to = to.map(parse_date).transpose()?;
        let tasks = TaskCollection::new(&self.store, project, self.options.clone());
        loaded(tasks.error())?;
        Ok(json_output(&stats::calendar_events(tasks.items(), from, to)))
    }
}

// === Helpers ===

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_str(s).map_err(|e| e.to_string())
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("Invalid date: '{s}'. Use YYYY-MM-DD or RFC 3339"))
}

/// Prefer the collection's localized message over the raw error.
fn slot_message(err: &Error, slot: Option<&str>) -> String {
    slot.map_or_else(|| err.to_string(), str::to_string)
}

fn loaded(error: Option<&str>) -> Result<(), String> {
    error.map_or(Ok(()), |message| Err(message.to_string()))
}

fn require_found(found: bool, entity: &'static str, id: &str) -> Result<(), String> {
    if found {
        Ok(())
    } else {
        Err(Error::not_found(entity, id).to_string())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn to_message(err: Error) -> String {
    err.to_string()
}

fn json_output<T: Serialize + ?Sized>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}

// === Output Types ===

/// One board column for the text view.
#[derive(Debug, Serialize)]
struct BoardColumnView {
    label: &'static str,
    tasks: Vec<BoardTaskView>,
}

/// One task card for the text view.
#[derive(Debug, Serialize)]
struct BoardTaskView {
    id: String,
    title: String,
    priority: Priority,
    position: u32,
    due_date: Option<String>,
    overdue: bool,
}

impl BoardTaskView {
    fn new(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            position: task.position,
            due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            overdue: task.is_overdue(now),
        }
    }
}
