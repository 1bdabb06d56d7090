//! Import statement recognition and grouping.

use std::fmt;

use crate::source::{Line, TokenKind};
use crate::utils::stdlib::is_stdlib;

/// Import group, ordered the way groups must appear in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ImportGroup {
    /// No import seen yet.
    #[default]
    NoneYet,
    /// Standard library.
    Stdlib,
    /// Installed third-party packages.
    ThirdParty,
    /// The project's own packages.
    Local,
}

impl fmt::Display for ImportGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoneYet => "none",
            Self::Stdlib => "standard-library",
            Self::ThirdParty => "third-party",
            Self::Local => "local",
        })
    }
}

/// Syntactic form of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportForm {
    /// `import a.b`
    Import,
    /// `from a.b import c`
    From,
}

/// An import statement recognised on a statement-start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Form of the statement.
    pub form: ImportForm,
    /// Dotted module paths, without leading dots.
    pub modules: Vec<String>,
    /// Whether a `from` import is relative (`from . import x`).
    pub relative: bool,
    /// Token index of the first comma separating modules in `import a, b`.
    pub extra_module: Option<usize>,
    /// Token index of `*` in `from a import *`.
    pub wildcard: Option<usize>,
}

impl ImportStatement {
    /// Recognises an import statement.
    #[must_use]
    pub fn parse(line: &Line) -> Option<Self> {
        match line.text_at(0) {
            "import" => Some(Self::parse_import(line)),
            "from" => Self::parse_from(line),
            _ => None,
        }
    }

    fn parse_import(line: &Line) -> Self {
        let mut modules = Vec::new();
        let mut current = String::new();
        let mut aliased = false;
        let mut extra_module = None;

        for (i, token) in line.tokens.iter().enumerate().skip(1) {
            let text = line.token_text(token);
            match token.kind {
                TokenKind::Comma if token.depth == 0 => {
                    extra_module.get_or_insert(i);
                    modules.push(std::mem::take(&mut current));
                    aliased = false;
                }
                TokenKind::Name if text == "as" => aliased = true,
                TokenKind::Name | TokenKind::Operator if !aliased && text != "\\" => {
                    current.push_str(text);
                }
                _ => {}
            }
        }
        if !current.is_empty() {
            modules.push(current);
        }
        modules.retain(|m| !m.is_empty());

        Self {
            form: ImportForm::Import,
            modules,
            relative: false,
            extra_module,
            wildcard: None,
        }
    }

    fn parse_from(line: &Line) -> Option<Self> {
        let import_at = line
            .tokens
            .iter()
            .position(|t| t.kind == TokenKind::Name && line.token_text(t) == "import")?;

        let path: String = line.tokens[1..import_at]
            .iter()
            .map(|t| line.token_text(t))
            .collect();
        let relative = path.starts_with('.');
        let module = path.trim_start_matches('.').to_string();

        let wildcard = line.tokens[import_at + 1..]
            .iter()
            .position(|t| t.kind == TokenKind::Operator && line.token_text(t) == "*")
            .map(|p| import_at + 1 + p);

        Some(Self {
            form: ImportForm::From,
            modules: if module.is_empty() { Vec::new() } else { vec![module] },
            relative,
            extra_module: None,
            wildcard,
        })
    }

    /// Top-level package of the first imported module.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        self.modules
            .first()
            .and_then(|m| m.split('.').next())
            .filter(|r| !r.is_empty())
    }
}

/// Assigns import statements to groups.
#[derive(Debug, Clone, Default)]
pub struct ImportClassifier {
    local_packages: Vec<String>,
}

impl ImportClassifier {
    /// Creates a classifier with no configured local packages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds top-level packages that belong to the project.
    #[must_use]
    pub fn with_local_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_packages
            .extend(packages.into_iter().map(Into::into));
        self
    }

    /// Returns the group of an import statement.
    #[must_use]
    pub fn classify(&self, import: &ImportStatement) -> ImportGroup {
        if import.relative {
            return ImportGroup::Local;
        }
        let Some(root) = import.root() else {
            return ImportGroup::Local;
        };
        if self.local_packages.iter().any(|p| p == root) {
            ImportGroup::Local
        } else if is_stdlib(root) {
            ImportGroup::Stdlib
        } else {
            ImportGroup::ThirdParty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_str;

    fn parse(src: &str) -> ImportStatement {
        let file = scan_str(src, "t.py");
        ImportStatement::parse(&file.lines[0]).unwrap()
    }

    #[test]
    fn parses_plain_import() {
        let import = parse("import os.path\n");
        assert_eq!(import.form, ImportForm::Import);
        assert_eq!(import.modules, vec!["os.path"]);
        assert_eq!(import.root(), Some("os"));
        assert!(import.extra_module.is_none());
    }

    #[test]
    fn parses_multiple_modules() {
        let import = parse("import os, sys as system\n");
        assert_eq!(import.modules, vec!["os", "sys"]);
        assert_eq!(import.extra_module, Some(2));
    }

    #[test]
    fn parses_from_import() {
        let import = parse("from collections import OrderedDict, defaultdict\n");
        assert_eq!(import.form, ImportForm::From);
        assert_eq!(import.modules, vec!["collections"]);
        assert!(import.extra_module.is_none());
        assert!(import.wildcard.is_none());
    }

    #[test]
    fn detects_wildcard() {
        let import = parse("from os.path import *\n");
        assert_eq!(import.wildcard, Some(5));
    }

    #[test]
    fn detects_relative_imports() {
        assert!(parse("from . import views\n").relative);
        assert!(parse("from ..models import User\n").relative);
        assert!(parse("from ...pkg import thing\n").relative);
        assert!(!parse("from pkg import thing\n").relative);
    }

    #[test]
    fn non_imports_are_ignored() {
        let file = scan_str("x = 1\n", "t.py");
        assert!(ImportStatement::parse(&file.lines[0]).is_none());
    }

    #[test]
    fn classifies_groups() {
        let classifier = ImportClassifier::new().with_local_packages(["myapp"]);
        assert_eq!(classifier.classify(&parse("import os\n")), ImportGroup::Stdlib);
        assert_eq!(
            classifier.classify(&parse("from __future__ import annotations\n")),
            ImportGroup::Stdlib
        );
        assert_eq!(classifier.classify(&parse("import numpy\n")), ImportGroup::ThirdParty);
        assert_eq!(
            classifier.classify(&parse("from myapp.models import User\n")),
            ImportGroup::Local
        );
        assert_eq!(classifier.classify(&parse("from . import views\n")), ImportGroup::Local);
    }

    #[test]
    fn groups_are_ordered() {
        assert!(ImportGroup::NoneYet < ImportGroup::Stdlib);
        assert!(ImportGroup::Stdlib < ImportGroup::ThirdParty);
        assert!(ImportGroup::ThirdParty < ImportGroup::Local);
    }
}
