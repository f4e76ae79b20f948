//! Localized messages for collection failures.

use crate::config::Locale;
use crate::planner::validation::{ValidationErrors, Violation};
use crate::templates;
use serde::Serialize;
use tera::Context;

/// What a collection was doing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Loading the collection.
    Load,
    /// Creating an item.
    Create,
    /// Updating an item.
    Update,
    /// Deleting an item.
    Delete,
    /// Archiving a project.
    Archive,
    /// Moving a task on the board.
    Move,
    /// Renumbering task positions.
    Repair,
}

impl Action {
    /// Short name used in event log entries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Archive => "archive",
            Self::Move => "move",
            Self::Repair => "repair",
        }
    }
}

/// Which collection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Projects.
    Project,
    /// Tasks.
    Task,
    /// Tags.
    Tag,
}

impl Subject {
    /// Entity name used in event log entries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Task => "task",
            Self::Tag => "tag",
        }
    }
}

/// The verb phrase completing "Failed to ..." or "Fehler beim ...".
#[must_use]
pub const fn phrase(locale: Locale, action: Action, subject: Subject) -> &'static str {
    use Action as A;
    use Subject as S;
    match locale {
        Locale::En => match (action, subject) {
            (A::Load, S::Project) => "load projects",
            (A::Load, S::Task) => "load tasks",
            (A::Load, S::Tag) => "load tags",
            (A::Create, S::Project) => "create project",
            (A::Create, S::Task) => "create task",
            (A::Create, S::Tag) => "create tag",
            (A::Update, S::Project) => "update project",
            (A::Update, S::Task) => "update task",
            (A::Update, S::Tag) => "update tag",
            (A::Delete, S::Project) => "delete project",
            (A::Delete, S::Task) => "delete task",
            (A::Delete, S::Tag) => "delete tag",
            (A::Archive, _) => "archive project",
            (A::Move, _) => "move task",
            (A::Repair, _) => "repair task positions",
        },
        Locale::De => match (action, subject) {
            (A::Load, S::Project) => "Laden der Projekte",
            (A::Load, S::Task) => "Laden der Aufgaben",
            (A::Load, S::Tag) => "Laden der Tags",
            (A::Create, S::Project) => "Erstellen des Projekts",
            (A::Create, S::Task) => "Erstellen der Aufgabe",
            (A::Create, S::Tag) => "Erstellen des Tags",
            (A::Update, S::Project) => "Aktualisieren des Projekts",
            (A::Update, S::Task) => "Aktualisieren der Aufgabe",
            (A::Update, S::Tag) => "Aktualisieren des Tags",
            (A::Delete, S::Project) => "Löschen des Projekts",
            (A::Delete, S::Task) => "Löschen der Aufgabe",
            (A::Delete, S::Tag) => "Löschen des Tags",
            (A::Archive, _) => "Archivieren des Projekts",
            (A::Move, _) => "Verschieben der Aufgabe",
            (A::Repair, _) => "Neunummerieren der Aufgaben",
        },
    }
}

/// Message for a failed operation, e.g. "Failed to load tasks: disk full".
#[must_use]
pub fn operation_failed(locale: Locale, action: Action, subject: Subject, detail: &str) -> String {
    let phrase = phrase(locale, action, subject);
    let name = format!("messages/{locale}/operation_failed.tera");
    templates::render_with_vars(&name, &[("phrase", phrase), ("detail", detail)]).map_or_else(
        |_| {
            let prefix = match locale {
                Locale::En => "Failed to",
                Locale::De => "Fehler beim",
            };
            if detail.is_empty() {
                format!("{prefix} {phrase}")
            } else {
                format!("{prefix} {phrase}: {detail}")
            }
        },
        |rendered| rendered.trim_end().to_string(),
    )
}

#[derive(Serialize)]
struct FieldView {
    field: &'static str,
    violation: &'static str,
}

/// Message listing rejected fields, e.g. "title is required".
#[must_use]
pub fn validation_failed(locale: Locale, errors: &ValidationErrors) -> String {
    let views: Vec<FieldView> = errors
        .0
        .iter()
        .map(|e| FieldView {
            field: e.field,
            violation: match e.violation {
                Violation::Required => "required",
                Violation::InvalidColor => "invalid_color",
            },
        })
        .collect();

    let mut context = Context::new();
    context.insert("errors", &views);
    let name = format!("messages/{locale}/validation_failed.tera");
    templates::render(&name, &context).map_or_else(
        |_| errors.0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
        |rendered| rendered.trim_end().to_string(),
    )
}
