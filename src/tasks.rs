//! Task list parsing for `tasks.md`.
//!
//! Recognises checklist items of the form
//!
//! ```text
//! ## Phase 1: Setup
//!
//! - [ ] **TASK-001**: Initialize project structure
//! - [x] **TASK-002**: Configure dependencies
//! ```
//!
//! Lines that do not match are ignored. The phase is the text of the most
//! recent `## ` heading, or empty before the first one.

use crate::artifact::TaskDefinition;

/// One checklist entry from a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub phase: String,
    pub done: bool,
}

impl TaskItem {
    /// Convert into a [`TaskDefinition`] with the title as description.
    pub fn into_definition(self) -> TaskDefinition {
        TaskDefinition {
            id: self.id,
            description: self.title.clone(),
            title: self.title,
            acceptance_criteria: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// Parse every task item in `markdown`, in document order.
pub fn parse_task_list(markdown: &str) -> Vec<TaskItem> {
    let mut phase = String::new();
    let mut items = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix("## ") {
            phase = heading.trim().to_string();
            continue;
        }
        if let Some(item) = parse_item(trimmed, &phase) {
            items.push(item);
        }
    }

    items
}

fn parse_item(line: &str, phase: &str) -> Option<TaskItem> {
    let rest = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))?;
    let (done, rest) = if let Some(r) = rest.strip_prefix("[ ] ") {
        (false, r)
    } else if let Some(r) = rest
        .strip_prefix("[x] ")
        .or_else(|| rest.strip_prefix("[X] "))
    {
        (true, r)
    } else {
        return None;
    };

    let rest = rest.trim_start().strip_prefix("**")?;
    let (id, rest) = rest.split_once("**")?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    let title = rest.trim_start().strip_prefix(':').unwrap_or(rest).trim();

    Some(TaskItem {
        id: id.to_string(),
        title: title.to_string(),
        phase: phase.to_string(),
        done,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKS: &str = "# Task Decomposition

## Phase 1: Setup

- [ ] **TASK-001**: Initialize project structure
- [x] **TASK-002**: Configure dependencies

## Phase 2: Core Implementation

- [ ] **TASK-003**: Implement data models
- [ ] plain checklist item without id

> Tasks will be auto-generated.
";

    #[test]
    fn test_parses_items_with_phase() {
        let items = parse_task_list(TASKS);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            TaskItem {
                id: "TASK-001".to_string(),
                title: "Initialize project structure".to_string(),
                phase: "Phase 1: Setup".to_string(),
                done: false,
            }
        );
        assert!(items[1].done);
        assert_eq!(items[2].phase, "Phase 2: Core Implementation");
    }

    #[test]
    fn test_ignores_non_task_lines() {
        assert!(parse_task_list("# Title\n\nSome prose.\n- bullet\n").is_empty());
        assert!(parse_task_list("").is_empty());
    }

    #[test]
    fn test_item_before_any_phase() {
        let items = parse_task_list("- [ ] **T1**: first\n");
        assert_eq!(items[0].phase, "");
        assert_eq!(items[0].title, "first");
    }

    #[test]
    fn test_into_definition() {
        let def = parse_task_list(TASKS).remove(0).into_definition();
        assert_eq!(def.id, "TASK-001");
        assert_eq!(def.title, "Initialize project structure");
        assert_eq!(def.description, def.title);
        assert!(def.dependencies.is_empty());
    }
}
