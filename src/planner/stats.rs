//! Dashboard and calendar derivations over loaded projects and tasks.

use crate::planner::models::{Project, Status, Task};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// How many tasks the dashboard lists as recent.
pub const RECENT_LIMIT: usize = 5;

/// Number of tasks in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// The status.
    pub status: Status,
    /// Tasks with it.
    pub count: usize,
}

/// Completion of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProgress {
    /// Project ID.
    pub project_id: String,
    /// Project name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Tasks in `done`.
    pub completed: usize,
    /// All tasks of the project.
    pub total: usize,
    /// `completed / total` as a rounded percentage, 0 for an empty project.
    pub percent: u8,
}

/// Summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Number of tasks.
    pub total: usize,
    /// Count per status, in board order.
    pub by_status: Vec<StatusCount>,
    /// Tasks past due and not done, earliest due first.
    pub overdue: Vec<Task>,
    /// Most recently created tasks, newest first.
    pub recent: Vec<Task>,
    /// Progress of each project, in the given order.
    pub projects: Vec<ProjectProgress>,
}

/// Build the dashboard summary.
#[must_use]
pub fn dashboard(projects: &[Project], tasks: &[Task], now: DateTime<Utc>) -> Dashboard {
    let by_status = Status::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: tasks.iter().filter(|t| t.status == status).count(),
        })
        .collect();

    let mut overdue: Vec<Task> = tasks.iter().filter(|t| t.is_overdue(now)).cloned().collect();
    overdue.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

    let mut recent: Vec<Task> = tasks.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    recent.truncate(RECENT_LIMIT);

    let projects = projects.iter().map(|p| project_progress(p, tasks)).collect();

    Dashboard { total: tasks.len(), by_status, overdue, recent, projects }
}

fn project_progress(project: &Project, tasks: &[Task]) -> ProjectProgress {
    let (completed, total) = tasks
        .iter()
        .filter(|t| t.project_id == project.id)
        .fold((0, 0), |(done, all), t| (done + usize::from(t.status == Status::Done), all + 1));

    ProjectProgress {
        project_id: project.id.clone(),
        name: project.name.clone(),
        color: project.color.clone(),
        completed,
        total,
        percent: percent(completed, total),
    }
}

fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    u8::try_from((part * 100 + whole / 2) / whole).unwrap_or(100)
}

/// What a calendar entry marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The task's due date.
    Due,
    /// When the task was created.
    Created,
}

/// One calendar entry derived from a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// `<task id>-due` or `<task id>-created`.
    pub id: String,
    /// The task.
    pub task_id: String,
    /// Task title.
    pub title: String,
    /// When the event happens.
    pub date: DateTime<Utc>,
    /// Event kind.
    pub kind: EventKind,
}

/// Calendar entries for tasks within `[from, to)`, in date order.
///
/// Either bound may be left open.
#[must_use]
pub fn calendar_events(
    tasks: &[Task],
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Vec<CalendarEvent> {
    let in_range = |date: DateTime<Utc>| {
        from.map_or(true, |start| start <= date) && to.map_or(true, |end| date < end)
    };

    let mut events: Vec<CalendarEvent> = tasks
        .iter()
        .flat_map(|task| {
            let due = task.due_date.map(|date| (EventKind::Due, date));
            let created = Some((EventKind::Created, task.created_at));
            due.into_iter().chain(created).map(move |(kind, date)| CalendarEvent {
                id: format!(
                    "{}-{}",
                    task.id,
                    match kind {
                        EventKind::Due => "due",
                        EventKind::Created => "created",
                    }
                ),
                task_id: task.id.clone(),
                title: task.title.clone(),
                date,
                kind,
            })
        })
        .filter(|event| in_range(event.date))
        .collect();

    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    events
}
