//! Import rules.
//!
//! # Configuration
//!
//! `import-group-order` reads `local_packages`: top-level package names
//! that belong to the project and therefore form the last group. Relative
//! imports are always local.

use pepcheck_core::imports::{ImportForm, ImportGroup};
use pepcheck_core::state::StatementKind;
use pepcheck_core::{Category, LineContext, Rule, Suggestion, Violation};

/// One module per `import` statement.
#[derive(Debug, Clone, Default)]
pub struct ImportOnePerLine;

impl ImportOnePerLine {
    /// Rule id.
    pub const NAME: &'static str = "import-one-per-line";
    /// Rule code.
    pub const CODE: &'static str = "PS401";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for ImportOnePerLine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Imports
    }

    fn description(&self) -> &'static str {
        "Each import statement imports exactly one module"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let Some((import, _)) = &ctx.state.current_import else {
            return Vec::new();
        };
        if import.form != ImportForm::Import {
            return Vec::new();
        }
        let Some(comma) = import.extra_module.and_then(|i| ctx.line.tokens.get(i)) else {
            return Vec::new();
        };
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.token_location(comma),
            format!("multiple modules on one import line ({})", import.modules.join(", ")),
        )
        .with_suggestion(Suggestion::new("Put each `import` on its own line"))]
    }
}

/// Imports form contiguous, correctly ordered groups.
#[derive(Debug, Clone, Default)]
pub struct ImportGroupOrder;

impl ImportGroupOrder {
    /// Rule id.
    pub const NAME: &'static str = "import-group-order";
    /// Rule code.
    pub const CODE: &'static str = "PS402";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn violation(&self, ctx: &LineContext, message: String) -> Violation {
        let location = ctx
            .line
            .tokens
            .first()
            .map_or_else(|| ctx.line_location(), |t| ctx.token_location(t));
        Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            location,
            message,
        )
    }
}

impl Rule for ImportGroupOrder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Imports
    }

    fn description(&self) -> &'static str {
        "Imports are grouped standard library, third party, local, one blank line apart"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let state = ctx.state;
        let Some((_, group)) = &state.current_import else {
            return Vec::new();
        };
        if ctx.line.indent.width != 0 {
            return Vec::new();
        }
        let group = *group;
        let cursor = state.import_group;

        if group < cursor {
            let after = state
                .last_import_line
                .map(|line| format!(" on line {line}"))
                .unwrap_or_default();
            return vec![self
                .violation(
                    ctx,
                    format!("{group} import after {cursor} import{after}"),
                )
                .with_suggestion(Suggestion::new(
                    "Order imports: standard library, third party, then local",
                ))];
        }

        let follows_import = state
            .previous
            .as_ref()
            .is_some_and(|p| p.kind == StatementKind::Import && p.indent == 0);
        if !follows_import || cursor == ImportGroup::NoneYet {
            return Vec::new();
        }

        let blanks = state.blank_before;
        if group > cursor && blanks != 1 {
            return vec![self.violation(
                ctx,
                format!(
                    "expected 1 blank line between {cursor} and {group} imports, found {blanks}"
                ),
            )];
        }
        if group == cursor && blanks != 0 {
            return vec![self.violation(
                ctx,
                format!("blank line inside the {group} import group"),
            )];
        }
        Vec::new()
    }
}

/// No `from module import *`.
#[derive(Debug, Clone, Default)]
pub struct NoWildcardImport;

impl NoWildcardImport {
    /// Rule id.
    pub const NAME: &'static str = "no-wildcard-import";
    /// Rule code.
    pub const CODE: &'static str = "PS403";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NoWildcardImport {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Imports
    }

    fn description(&self) -> &'static str {
        "Wildcard imports are forbidden"
    }

    fn is_stateful(&self) -> bool {
        true
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let Some((import, _)) = &ctx.state.current_import else {
            return Vec::new();
        };
        let Some(star) = import.wildcard.and_then(|i| ctx.line.tokens.get(i)) else {
            return Vec::new();
        };
        let module = import.modules.first().map_or(".", String::as_str);
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.token_location(star),
            format!("wildcard import from `{module}`"),
        )
        .with_suggestion(Suggestion::new("Import the names you use explicitly"))]
    }
}
