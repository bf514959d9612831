//! Template documents written when Spec-Kit has not produced them.
//!
//! A fresh project gets a `spec.md`, `plan.md` and `tasks.md` filled from
//! the seed so the rest of the pipeline always has documents to index.
//! Existing files are never overwritten.

use std::io;
use std::path::{Path, PathBuf};

use crate::seed::{write_artifact, Seed};

pub const SPEC_FILE: &str = "spec.md";
pub const PLAN_FILE: &str = "plan.md";
pub const TASKS_FILE: &str = "tasks.md";

/// The specification documents, in indexing order.
pub const DOCUMENTS: [&str; 3] = [SPEC_FILE, PLAN_FILE, TASKS_FILE];

pub fn render_spec(seed: &Seed) -> String {
    format!(
        "# Specification: {name}

## Overview

{description}

## Intent

{intent}

## Functional Requirements

> This section will be populated by the Spec-Kit specify command.
> For now, use this as a template to define your requirements.

### User Stories

1. As a developer, I want to...

### Acceptance Criteria

- [ ] Criterion 1
- [ ] Criterion 2

## Non-Functional Requirements

- Performance: TBD
- Security: TBD
- Scalability: TBD
",
        name = seed.project_name(),
        description = seed.description(),
        intent = seed.intent(),
    )
}

pub fn render_plan(seed: &Seed) -> String {
    format!(
        "# Technical Architecture Plan

## Technology Stack

- **Language**: {language}
- **Framework**: {framework}
- **Database**: {database}

## Architecture Decisions

### Decision 1: [Title]

**Rationale**: TBD

### Decision 2: [Title]

**Rationale**: TBD

## Component Structure

```
src/
├── main.py          # Application entry point
├── api/             # API routes
├── models/          # Data models
├── services/        # Business logic
└── utils/           # Utilities
```

## API Design

> This section will be populated by the Spec-Kit plan command.
",
        language = seed.language(),
        framework = seed.framework(),
        database = seed.database(),
    )
}

pub fn render_tasks() -> String {
    "# Task Decomposition

## Phase 1: Setup

- [ ] **TASK-001**: Initialize project structure
- [ ] **TASK-002**: Configure dependencies

## Phase 2: Core Implementation

- [ ] **TASK-003**: Implement data models
- [ ] **TASK-004**: Implement API routes
- [ ] **TASK-005**: Implement business logic

## Phase 3: Testing & Validation

- [ ] **TASK-006**: Write unit tests
- [ ] **TASK-007**: Write integration tests
- [ ] **TASK-008**: Run full validation

> Tasks will be auto-generated by the Spec-Kit tasks command.
> Each task should be atomic and independently implementable.
"
    .to_string()
}

/// Write each placeholder document that does not yet exist in `dir`.
///
/// Returns the paths that were written.
pub fn generate_missing(seed: &Seed, dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for name in DOCUMENTS {
        let path = dir.join(name);
        if path.exists() {
            tracing::debug!(path = %path.display(), "keeping existing document");
            continue;
        }
        let content = match name {
            SPEC_FILE => render_spec(seed),
            PLAN_FILE => render_plan(seed),
            _ => render_tasks(),
        };
        write_artifact(&path, &content)?;
        written.push(path);
    }
    Ok(written)
}
