//! Syntax checking for generated source code.
//!
//! Generated code is parsed before it is accepted. Python goes through a
//! CPython-grammar parser ([`PythonChecker`]) so indentation errors and
//! Python 2 statements are rejected the way the interpreter rejects them.
//! Rust and JavaScript are parsed with tree-sitter ([`TreeSitterChecker`]),
//! reporting the first `ERROR` or `MISSING` node.
//!
//! Every error carries a 1-based line and column so the message can be fed
//! back to the generator.

use std::fmt;
use std::path::Path;

use rustpython_parser::{parse, Mode};
use thiserror::Error;
use tree_sitter::{Node, Parser};

/// Languages the factory can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Python,
    Rust,
    JavaScript,
}

impl SourceLanguage {
    /// Detect the language from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext {
            "py" | "pyi" => Some(Self::Python),
            "rs" => Some(Self::Rust),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            _ => None,
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Python => "python",
            Self::Rust => "rust",
            Self::JavaScript => "javascript",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid syntax at line {line}, column {column}: {message}")]
    Invalid {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("invalid syntax at line {line}, column {column}: unexpected {snippet:?}")]
    Unexpected {
        line: usize,
        column: usize,
        snippet: String,
    },
    #[error("invalid syntax at line {line}, column {column}: missing {expected}")]
    Missing {
        line: usize,
        column: usize,
        expected: String,
    },
    #[error("{0} parser unavailable: {1}")]
    Parser(SourceLanguage, String),
}

/// Checks that source text is syntactically valid.
pub trait SyntaxChecker {
    fn language(&self) -> SourceLanguage;
    fn check(&self, source: &str) -> Result<(), SyntaxError>;
}

/// The checker used for `language`.
pub fn checker_for(language: SourceLanguage) -> Box<dyn SyntaxChecker> {
    match language {
        SourceLanguage::Python => Box::new(PythonChecker),
        other => Box::new(TreeSitterChecker::new(other)),
    }
}

// ============ Python ============

/// Python 3 checker backed by a CPython-grammar parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonChecker;

impl SyntaxChecker for PythonChecker {
    fn language(&self) -> SourceLanguage {
        SourceLanguage::Python
    }

    fn check(&self, source: &str) -> Result<(), SyntaxError> {
        match parse(source, Mode::Module, "<artifact>") {
            Ok(_) => Ok(()),
            Err(e) => {
                let (line, column) = line_column(source, u32::from(e.offset) as usize);
                Err(SyntaxError::Invalid {
                    line,
                    column,
                    message: e.error.to_string(),
                })
            }
        }
    }
}

/// 1-based line and column of the byte `offset` in `source`.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

// ============ Tree-sitter ============

/// Tree-sitter backed checker for Rust and JavaScript.
#[derive(Debug, Clone, Copy)]
pub struct TreeSitterChecker {
    language: SourceLanguage,
}

impl TreeSitterChecker {
    pub fn new(language: SourceLanguage) -> Self {
        Self { language }
    }

    fn grammar(&self) -> Option<tree_sitter::Language> {
        match self.language {
            SourceLanguage::Rust => Some(tree_sitter_rust::language()),
            SourceLanguage::JavaScript => Some(tree_sitter_javascript::language()),
            SourceLanguage::Python => None,
        }
    }
}

impl SyntaxChecker for TreeSitterChecker {
    fn language(&self) -> SourceLanguage {
        self.language
    }

    fn check(&self, source: &str) -> Result<(), SyntaxError> {
        let grammar = self.grammar().ok_or_else(|| {
            SyntaxError::Parser(self.language, "no tree-sitter grammar bundled".to_string())
        })?;
        let mut parser = Parser::new();
        parser
            .set_language(grammar)
            .map_err(|e| SyntaxError::Parser(self.language, e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::Parser(self.language, "parse aborted".to_string()))?;

        let root = tree.root_node();
        if !root.has_error() {
            return Ok(());
        }

        match first_error(root) {
            Some(node) => Err(describe(node, source)),
            None => {
                let pos = root.start_position();
                Err(SyntaxError::Unexpected {
                    line: pos.row + 1,
                    column: pos.column + 1,
                    snippet: String::new(),
                })
            }
        }
    }
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn describe(node: Node<'_>, source: &str) -> SyntaxError {
    let pos = node.start_position();
    let line = pos.row + 1;
    let column = pos.column + 1;
    if node.is_missing() {
        SyntaxError::Missing {
            line,
            column,
            expected: node.kind().to_string(),
        }
    } else {
        let text = source.get(node.byte_range()).unwrap_or_default();
        let snippet: String = text.lines().next().unwrap_or_default().chars().take(40).collect();
        SyntaxError::Unexpected {
            line,
            column,
            snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(lang: SourceLanguage, src: &str) -> Result<(), SyntaxError> {
        checker_for(lang).check(src)
    }

    #[test]
    fn test_valid_python() {
        let code = "\ndef hello():\n    return \"Hello\"\n\nif __name__ == \"__main__\":\n    print(hello())\n";
        assert!(check(SourceLanguage::Python, code).is_ok());
        assert!(check(SourceLanguage::Python, "pass").is_ok());
        assert!(check(SourceLanguage::Python, "").is_ok());
        assert!(check(SourceLanguage::Python, "class A:\n    x: int = 1\n").is_ok());
    }

    #[test]
    fn test_unbalanced_python_rejected() {
        let err = check(SourceLanguage::Python, "def hello(\n    return \"Hello\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid syntax"), "{}", err);
    }

    #[test]
    fn test_python2_statements_rejected() {
        assert!(check(SourceLanguage::Python, "print \"hello\"").is_err());
        assert!(check(SourceLanguage::Python, "exec \"x = 1\"").is_err());
    }

    #[test]
    fn test_python_indentation_errors_rejected() {
        assert!(check(SourceLanguage::Python, "x = 1\n    y = 2\n").is_err());
        assert!(check(SourceLanguage::Python, "def f():\nreturn 1\n").is_err());
        assert!(check(SourceLanguage::Python, "class A:\n").is_err());
    }

    #[test]
    fn test_python_error_position() {
        match check(SourceLanguage::Python, "x = 1\ny = (\n").unwrap_err() {
            SyntaxError::Invalid { line, .. } => assert!(line >= 2, "line {}", line),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("abc", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("ab", 99), (1, 3));
    }

    #[test]
    fn test_valid_and_invalid_rust() {
        assert!(check(SourceLanguage::Rust, "fn main() { println!(\"hi\"); }").is_ok());
        assert!(check(SourceLanguage::Rust, "fn main( { ").is_err());
    }

    #[test]
    fn test_valid_and_invalid_javascript() {
        assert!(check(SourceLanguage::JavaScript, "const x = () => 1;\n").is_ok());
        assert!(check(SourceLanguage::JavaScript, "function (").is_err());
    }

    #[test]
    fn test_tree_sitter_has_no_python_grammar() {
        let err = TreeSitterChecker::new(SourceLanguage::Python)
            .check("pass")
            .unwrap_err();
        assert!(matches!(err, SyntaxError::Parser(SourceLanguage::Python, _)));
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(SourceLanguage::from_path("src/main.py"), Some(SourceLanguage::Python));
        assert_eq!(SourceLanguage::from_path("lib.rs"), Some(SourceLanguage::Rust));
        assert_eq!(SourceLanguage::from_path("app.mjs"), Some(SourceLanguage::JavaScript));
        assert_eq!(SourceLanguage::from_path("README.md"), None);
        assert_eq!(SourceLanguage::from_path("Makefile"), None);
    }
}
