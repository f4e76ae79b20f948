//! Field-level validation for drafts, run before anything reaches the store.
//!
//! The `prepare_*` functions trim text fields, turn blank optional text into
//! `None`, and reject drafts with missing required fields or malformed colors.

use crate::planner::store::{NewProject, NewTag, NewTask, ProjectUpdate, TagUpdate, TaskUpdate};
use once_cell::sync::Lazy;
use regex::Regex;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color regex is valid"));

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The field is empty or blank.
    Required,
    /// The field is not a `#RRGGBB` color.
    InvalidColor,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears on the draft type.
    pub field: &'static str,
    /// The rule it broke.
    pub violation: Violation,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.violation {
            Violation::Required => write!(f, "{} is required", self.field),
            Violation::InvalidColor => write!(f, "{} must be a #RRGGBB color", self.field),
        }
    }
}

/// All field errors found in one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, violation: Violation) {
        self.0.push(FieldError { field, violation });
    }

    /// Whether `field` was rejected.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn trimmed(text: String) -> String {
    let t = text.trim();
    if t.len() == text.len() {
        text
    } else {
        t.to_string()
    }
}

fn blank_to_none(text: Option<String>) -> Option<String> {
    text.map(trimmed).filter(|t| !t.is_empty())
}

fn check_color(errors: &mut ValidationErrors, field: &'static str, color: &str) {
    if !COLOR_RE.is_match(color) {
        errors.push(field, Violation::InvalidColor);
    }
}

/// Normalize and validate a new project.
///
/// # Errors
///
/// Returns the field errors if the name is blank or the color is malformed.
pub fn prepare_new_project(mut project: NewProject) -> Result<NewProject, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    project.name = trimmed(project.name);
    project.description = blank_to_none(project.description);
    project.icon = blank_to_none(project.icon);

    if project.name.is_empty() {
        errors.push("name", Violation::Required);
    }
    check_color(&mut errors, "color", &project.color);

    errors.into_result().map(|()| project)
}

/// Normalize and validate a project update.
///
/// # Errors
///
/// Returns the field errors if a new name is blank or a new color is malformed.
pub fn prepare_project_update(
    mut update: ProjectUpdate,
) -> Result<ProjectUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    update.name = update.name.map(trimmed);
    update.description = update.description.map(blank_to_none);
    update.icon = update.icon.map(blank_to_none);

    if update.name.as_deref() == Some("") {
        errors.push("name", Violation::Required);
    }
    if let Some(color) = &update.color {
        check_color(&mut errors, "color", color);
    }

    errors.into_result().map(|()| update)
}

/// Normalize and validate a new task.
///
/// # Errors
///
/// Returns the field errors if the title or the project is missing.
pub fn prepare_new_task(mut task: NewTask) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    task.title = trimmed(task.title);
    task.project_id = trimmed(task.project_id);
    task.description = blank_to_none(task.description);
    task.assigned_to = blank_to_none(task.assigned_to);

    if task.title.is_empty() {
        errors.push("title", Violation::Required);
    }
    if task.project_id.is_empty() {
        errors.push("project_id", Violation::Required);
    }

    errors.into_result().map(|()| task)
}

/// Normalize and validate a task update.
///
/// # Errors
///
/// Returns the field errors if a new title or project is blank.
pub fn prepare_task_update(mut update: TaskUpdate) -> Result<TaskUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    update.title = update.title.map(trimmed);
    update.project_id = update.project_id.map(trimmed);
    update.description = update.description.map(blank_to_none);
    update.assigned_to = update.assigned_to.map(blank_to_none);

    if update.title.as_deref() == Some("") {
        errors.push("title", Violation::Required);
    }
    if update.project_id.as_deref() == Some("") {
        errors.push("project_id", Violation::Required);
    }

    errors.into_result().map(|()| update)
}

/// Normalize and validate a new tag.
///
/// # Errors
///
/// Returns the field errors if the name is blank or the color is malformed.
pub fn prepare_new_tag(mut tag: NewTag) -> Result<NewTag, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    tag.name = trimmed(tag.name);

    if tag.name.is_empty() {
        errors.push("name", Violation::Required);
    }
    check_color(&mut errors, "color", &tag.color);

    errors.into_result().map(|()| tag)
}

/// Normalize and validate a tag update.
///
/// # Errors
///
/// Returns the field errors if a new name is blank or a new color is malformed.
pub fn prepare_tag_update(mut update: TagUpdate) -> Result<TagUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    update.name = update.name.map(trimmed);

    if update.name.as_deref() == Some("") {
        errors.push("name", Violation::Required);
    }
    if let Some(color) = &update.color {
        check_color(&mut errors, "color", color);
    }

    errors.into_result().map(|()| update)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_requires_title_and_project() {
        let errors = prepare_new_task(NewTask::new("  ", "   ")).unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("project_id"));
        assert_eq!(
            errors.to_string(),
            "validation failed: title is required; project_id is required"
        );
    }

    #[test]
    fn test_new_task_is_trimmed() {
        let task = prepare_new_task(NewTask {
            description: Some("   ".to_string()),
            ..NewTask::new(" p1 ", "  Pay rent ")
        })
        .unwrap();
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.project_id, "p1");
        assert_eq!(task.description, None);
    }

    #[test]
    fn test_task_update_rejects_blank_title_only_when_set() {
        assert!(prepare_task_update(TaskUpdate::default()).is_ok());
        let errors = prepare_task_update(TaskUpdate {
            title: Some(" ".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(errors.0, vec![FieldError { field: "title", violation: Violation::Required }]);
    }

    #[test]
    fn test_project_color() {
        assert!(prepare_new_project(NewProject::named("Garden")).is_ok());

        let errors = prepare_new_project(NewProject {
            color: "blue".to_string(),
            ..NewProject::named("Garden")
        })
        .unwrap_err();
        assert!(errors.has("color"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn test_project_update_clears_blank_description() {
        let update = prepare_project_update(ProjectUpdate {
            description: Some(Some("  ".to_string())),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(update.description, Some(None));
    }

    #[test]
    fn test_tag_validation() {
        let tag = NewTag { name: " ops ".to_string(), color: "#10B981".to_string() };
        let tag = prepare_new_tag(tag).unwrap();
        assert_eq!(tag.name, "ops");

        let update = TagUpdate { name: Some(String::new()), color: Some("#12".to_string()) };
        let errors = prepare_tag_update(update).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("color"));
    }
}
