//! Declarative contracts for the generation agents.
//!
//! A [`Signature`] names the inputs an agent receives and the outputs it
//! must produce, with a short instruction block. Signatures are static
//! data: they render a prompt from named inputs and validate outputs, but
//! do not call a model themselves.
//!
//! # Signatures
//!
//! | Signature | Inputs | Outputs |
//! |-----------|--------|---------|
//! | [`GENERATE_CODE`] | context, task, plan | artifact |
//! | [`GENERATE_SPEC`] | intent, tech_stack, governance | specification |
//! | [`GENERATE_PLAN`] | specification, tech_stack | plan |
//! | [`DECOMPOSE_TASKS`] | plan, specification | tasks |
//! | [`DEBUG_CODE`] | code, error, context | fixed_code, explanation |

use anyhow::{bail, Result};
use serde::Serialize;

use crate::artifact::{ArtifactError, CodeArtifact};

// ═══════════════════════════════════════════════════════════════════════
// Data Types
// ═══════════════════════════════════════════════════════════════════════

/// One named input or output of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
}

/// A typed agent contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: &'static str,
    /// Task instructions placed at the top of the prompt.
    pub instructions: &'static str,
    pub inputs: &'static [Field],
    pub outputs: &'static [Field],
}

const fn field(name: &'static str, description: &'static str) -> Field {
    Field { name, description }
}

// ═══════════════════════════════════════════════════════════════════════
// Signatures
// ═══════════════════════════════════════════════════════════════════════

/// Implement a feature based on a Spec-Kit task. The output must be a
/// JSON [`CodeArtifact`].
pub const GENERATE_CODE: Signature = Signature {
    name: "GenerateCode",
    instructions: "Implement a feature based on a Spec-Kit task. \
                   Respond with a code artifact whose content is syntactically valid.",
    inputs: &[
        field("context", "Relevant sections from AGENTS.md and project context"),
        field("task", "The specific task description to implement"),
        field("plan", "Architectural constraints from the plan"),
    ],
    outputs: &[field(
        "artifact",
        "The executable code artifact as JSON with filename, content, dependencies and test_plan",
    )],
};

pub const GENERATE_SPEC: Signature = Signature {
    name: "GenerateSpec",
    instructions: "Generate a functional specification from the project intent, \
                   with user stories and acceptance criteria.",
    inputs: &[
        field("intent", "The project intent from seed.json"),
        field("tech_stack", "Technology stack configuration"),
        field("governance", "Governance rules and constraints"),
    ],
    outputs: &[field(
        "specification",
        "Complete functional specification in markdown format",
    )],
};

pub const GENERATE_PLAN: Signature = Signature {
    name: "GeneratePlan",
    instructions: "Generate a technical architecture plan from the specification: \
                   library choices, database schemas and API signatures.",
    inputs: &[
        field("specification", "The functional specification"),
        field("tech_stack", "Technology stack constraints"),
    ],
    outputs: &[field("plan", "Technical architecture plan in markdown format")],
};

pub const DECOMPOSE_TASKS: Signature = Signature {
    name: "DecomposeTasks",
    instructions: "Decompose the plan into atomic, independently executable units of work.",
    inputs: &[
        field("plan", "The technical architecture plan"),
        field("specification", "The functional specification"),
    ],
    outputs: &[field("tasks", "Task list in markdown checklist format")],
};

/// Used when generated code fails lint or tests.
pub const DEBUG_CODE: Signature = Signature {
    name: "DebugCode",
    instructions: "Analyze and fix code that failed validation.",
    inputs: &[
        field("code", "The code that failed validation"),
        field("error", "The error message from validation"),
        field("context", "Relevant context from AGENTS.md"),
    ],
    outputs: &[
        field("fixed_code", "The corrected code"),
        field("explanation", "Explanation of the fix"),
    ],
};

/// Every signature, in pipeline order.
pub const ALL: [Signature; 5] = [
    GENERATE_SPEC,
    GENERATE_PLAN,
    DECOMPOSE_TASKS,
    GENERATE_CODE,
    DEBUG_CODE,
];

/// Look up a signature by name.
pub fn find(name: &str) -> Option<Signature> {
    ALL.iter().copied().find(|s| s.name == name)
}

impl Signature {
    /// Render a prompt from `(name, value)` inputs.
    ///
    /// Every declared input must be supplied. Inputs the signature does
    /// not declare are rejected.
    pub fn render(&self, inputs: &[(&str, &str)]) -> Result<String> {
        for (name, _) in inputs {
            if !self.inputs.iter().any(|f| f.name == *name) {
                bail!("{}: unknown input '{}'", self.name, name);
            }
        }

        let mut out = String::new();
        out.push_str(self.instructions);
        out.push_str("\n\n");

        for field in self.inputs {
            let value = inputs
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, v)| *v);
            let Some(value) = value else {
                bail!("{}: missing input '{}'", self.name, field.name);
            };
            out.push_str(&format!("## {} ({})\n{}\n\n", field.name, field.description, value));
        }

        out.push_str("Respond with:\n");
        for field in self.outputs {
            out.push_str(&format!("- {}: {}\n", field.name, field.description));
        }
        Ok(out)
    }
}

/// Validate the JSON output of [`GENERATE_CODE`].
pub fn parse_code_artifact(json: &str) -> Result<CodeArtifact, ArtifactError> {
    CodeArtifact::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_inputs_in_declared_order() {
        let prompt = GENERATE_CODE
            .render(&[
                ("plan", "Use FastAPI."),
                ("context", "# Global Context"),
                ("task", "TASK-001: Initialize project structure"),
            ])
            .unwrap();
        let ctx = prompt.find("## context").unwrap();
        let task = prompt.find("## task").unwrap();
        let plan = prompt.find("## plan").unwrap();
        assert!(ctx < task && task < plan);
        assert!(prompt.starts_with(GENERATE_CODE.instructions));
        assert!(prompt.contains("- artifact:"));
    }

    #[test]
    fn test_render_missing_input_errors() {
        let err = GENERATE_PLAN
            .render(&[("specification", "spec")])
            .unwrap_err();
        assert!(err.to_string().contains("missing input 'tech_stack'"));
    }

    #[test]
    fn test_render_unknown_input_errors() {
        assert!(DECOMPOSE_TASKS
            .render(&[("plan", "p"), ("specification", "s"), ("extra", "x")])
            .is_err());
    }

    #[test]
    fn test_debug_code_has_two_outputs() {
        let names: Vec<&str> = DEBUG_CODE.outputs.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["fixed_code", "explanation"]);
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find("GenerateSpec"), Some(GENERATE_SPEC));
        assert!(find("Nope").is_none());
    }

    #[test]
    fn test_parse_code_artifact_validates() {
        let ok = r#"{"filename": "src/main.py", "content": "print(1)", "test_plan": "run it"}"#;
        assert_eq!(parse_code_artifact(ok).unwrap().filename, "src/main.py");
        let bad = r#"{"filename": "src/main.py", "content": "def (", "test_plan": "run it"}"#;
        assert!(matches!(parse_code_artifact(bad), Err(ArtifactError::Syntax(_))));
    }
}
