//! Validated output records for the generation agents.
//!
//! These are the contracts agent output must satisfy before anything is
//! written to disk. [`CodeArtifact`] checks the syntax of its content when
//! it is constructed (directly or by deserialization), so a bad generation
//! surfaces as an [`ArtifactError`] that can be fed back to the model
//! instead of a broken file in the project.
//!
//! All records reject unknown fields and perform no type coercion.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::syntax::{checker_for, SourceLanguage, SyntaxChecker, SyntaxError};

/// Language assumed when the filename does not identify one.
pub const DEFAULT_LANGUAGE: SourceLanguage = SourceLanguage::Python;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Generated code has syntax errors: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCodeArtifact")]
pub struct CodeArtifact {
    /// Path relative to the project root (e.g. `src/models/user.py`).
    pub filename: String,
    /// Source code; always syntactically valid for its language.
    pub content: String,
    /// New packages the code requires.
    pub dependencies: Vec<String>,
    /// How this file should be tested.
    pub test_plan: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCodeArtifact {
    filename: String,
    content: String,
    #[serde(default)]
    dependencies: Vec<String>,
    test_plan: String,
}

impl TryFrom<RawCodeArtifact> for CodeArtifact {
    type Error = ArtifactError;

    fn try_from(raw: RawCodeArtifact) -> Result<Self, Self::Error> {
        Ok(CodeArtifact::new(raw.filename, raw.content, raw.test_plan)?
            .with_dependencies(raw.dependencies))
    }
}

impl CodeArtifact {
    /// Build an artifact, checking `content` in the language implied by
    /// `filename` (Python when the extension is not recognised).
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        test_plan: impl Into<String>,
    ) -> Result<Self, ArtifactError> {
        let filename = filename.into();
        let language = SourceLanguage::from_path(&filename).unwrap_or(DEFAULT_LANGUAGE);
        Self::with_checker(checker_for(language).as_ref(), filename, content, test_plan)
    }

    /// Build an artifact using an explicit checker.
    pub fn with_checker(
        checker: &dyn SyntaxChecker,
        filename: impl Into<String>,
        content: impl Into<String>,
        test_plan: impl Into<String>,
    ) -> Result<Self, ArtifactError> {
        let content = content.into();
        checker.check(&content)?;
        Ok(Self {
            filename: filename.into(),
            content,
            dependencies: Vec::new(),
            test_plan: test_plan.into(),
        })
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Parse and validate an artifact from JSON agent output.
    ///
    /// Malformed JSON is [`ArtifactError::Json`]; well-formed JSON whose
    /// content does not parse is [`ArtifactError::Syntax`].
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let raw: RawCodeArtifact = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Language the content was checked against.
    pub fn language(&self) -> SourceLanguage {
        SourceLanguage::from_path(Path::new(&self.filename)).unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// An atomic unit of work from task decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub acceptance_criteria: Vec<String>,
    /// IDs of tasks that must be completed first.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// One section of the technical architecture plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanSection {
    pub title: String,
    /// Section body in markdown.
    pub content: String,
    /// Why the decision was made.
    pub rationale: String,
}
