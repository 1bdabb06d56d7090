//! Naming conventions.
//!
//! Three rules share the helpers here:
//!
//! - `naming-function` checks function names, variables and loop targets
//!   against `lower_case_with_underscores`.
//! - `naming-class` checks class names against `CapWords`.
//! - `naming-constant` checks module-level names bound once to a literal
//!   against `ALL_CAPS`, and flags rebinding of such constants.

use pepcheck_core::state::StatementKind;
use pepcheck_core::syntax::{is_keyword, Assignment};
use pepcheck_core::{
    Category, Line, LineContext, LineKind, Rule, Severity, Suggestion, Token, TokenKind,
    Violation,
};

/// Names that read as digits in many fonts.
const AMBIGUOUS: &[&str] = &["l", "O", "I"];

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// `lower_case_with_underscores`, ignoring leading and trailing underscores.
fn is_snake_case(name: &str) -> bool {
    let core = name.trim_matches('_');
    !core.starts_with(|c: char| c.is_ascii_digit())
        && core
            .chars()
            .all(|c| c.is_lowercase() || c.is_ascii_digit() || c == '_')
}

/// `ALL_CAPS_WITH_UNDERSCORES`, with at least one letter.
fn is_all_caps(name: &str) -> bool {
    name.chars().any(char::is_uppercase)
        && name
            .chars()
            .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `CapWords`, allowing leading underscores for private classes.
fn is_cap_words(name: &str) -> bool {
    let core = name.trim_start_matches('_');
    core.starts_with(char::is_uppercase) && core.chars().all(char::is_alphanumeric)
}

fn is_single_letter(name: &str) -> bool {
    name != "_" && name.chars().count() == 1
}

/// Converts `camelCase` or `ALL_CAPS` to `snake_case` for suggestions.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            out.push(c);
        }
    }
    out
}

/// Index of the name token after `def` or `class` (with optional `async`).
fn definition_name(ctx: &LineContext, keyword: &str) -> Option<usize> {
    let line = ctx.line;
    let at = if line.text_at(0) == "async" { 1 } else { 0 };
    if line.text_at(at) != keyword {
        return None;
    }
    line.tokens
        .get(at + 1)
        .filter(|t| t.kind == TokenKind::Name)
        .map(|_| at + 1)
}

/// Token indices of the names bound by a `for` header.
fn loop_targets(ctx: &LineContext) -> Vec<usize> {
    let line = ctx.line;
    let at = if line.text_at(0) == "async" { 1 } else { 0 };
    if line.text_at(at) != "for" {
        return Vec::new();
    }
    line.tokens
        .iter()
        .enumerate()
        .skip(at + 1)
        .take_while(|(_, t)| !(t.kind == TokenKind::Name && line.token_text(t) == "in"))
        .filter(|(_, t)| t.kind == TokenKind::Name && !is_keyword(line.token_text(t)))
        .map(|(i, _)| i)
        .collect()
}

/// Token indices of the parameter names on a `def` header line.
///
/// `header` is false for a continuation line of a multi-line signature,
/// where a name opening the line also starts a parameter. Annotations and
/// defaults are skipped because their names follow `:` or `=`, or sit in
/// nested brackets.
fn parameter_names(line: &Line, header: bool) -> Vec<usize> {
    let tokens = &line.tokens;
    (0..tokens.len())
        .filter(|&i| {
            let token = &tokens[i];
            if token.kind != TokenKind::Name || token.depth != 1 || token.enclosing != Some('(') {
                return false;
            }
            let mut start = i;
            while start > 0
                && tokens[start - 1].kind == TokenKind::Operator
                && matches!(line.text_at(start - 1), "*" | "**")
            {
                start -= 1;
            }
            match start.checked_sub(1).map(|p| &tokens[p]) {
                Some(prev) => {
                    prev.kind == TokenKind::Comma
                        || (prev.kind == TokenKind::Open && prev.depth == 0)
                }
                None => !header,
            }
        })
        .collect()
}

/// Whether a line starts a code statement the naming rules look at.
fn is_code_statement(ctx: &LineContext) -> bool {
    ctx.line.starts_statement() && ctx.line.kind == LineKind::Code
}

/// Function, method and variable names are `lower_case_with_underscores`.
#[derive(Debug, Clone, Default)]
pub struct NamingFunction;

impl NamingFunction {
    /// Rule id.
    pub const NAME: &'static str = "naming-function";
    /// Rule code.
    pub const CODE: &'static str = "PS501";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_parameters(&self, ctx: &LineContext, header: bool) -> Vec<Violation> {
        parameter_names(ctx.line, header)
            .into_iter()
            .filter_map(|i| self.check_name(ctx, &ctx.line.tokens[i], "parameter", false))
            .collect()
    }

    fn violation(&self, ctx: &LineContext, token: &Token, message: String) -> Violation {
        Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.token_location(token),
            message,
        )
    }

    /// Checks one bound name. `loop_scope` allows single-letter names.
    fn check_name(
        &self,
        ctx: &LineContext,
        token: &Token,
        what: &str,
        loop_scope: bool,
    ) -> Option<Violation> {
        let name = ctx.line.token_text(token);
        if name == "_" || is_dunder(name) {
            return None;
        }
        if AMBIGUOUS.contains(&name) {
            return Some(
                self.violation(ctx, token, format!("ambiguous {what} name `{name}`"))
                    .with_suggestion(Suggestion::new(
                        "`l`, `O` and `I` are easily confused with digits",
                    )),
            );
        }
        if is_single_letter(name) {
            if loop_scope {
                return None;
            }
            return Some(
                self.violation(
                    ctx,
                    token,
                    format!("single-letter {what} name `{name}` outside a loop"),
                )
                .with_suggestion(Suggestion::new("Use a descriptive name")),
            );
        }
        if is_snake_case(name) {
            return None;
        }
        Some(
            self.violation(
                ctx,
                token,
                format!("{what} name `{name}` is not lower_case_with_underscores"),
            )
            .with_suggestion(Suggestion::new(format!("Rename to `{}`", to_snake_case(name)))),
        )
    }
}

impl Rule for NamingFunction {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn description(&self) -> &'static str {
        "Functions and variables use lower_case_with_underscores"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let in_signature = ctx
            .state
            .statement
            .as_ref()
            .is_some_and(|s| s.kind == StatementKind::Function);
        if line.continuation && !line.starts_in_string && line.kind == LineKind::Code && in_signature {
            return self.check_parameters(ctx, false);
        }
        if !is_code_statement(ctx) {
            return Vec::new();
        }
        let in_loop = ctx.state.in_loop();

        if let Some(i) = definition_name(ctx, "def") {
            let mut violations: Vec<Violation> = self
                .check_name(ctx, &line.tokens[i], "function", in_loop)
                .into_iter()
                .collect();
            violations.extend(self.check_parameters(ctx, true));
            return violations;
        }

        let targets = loop_targets(ctx);
        if !targets.is_empty() {
            return targets
                .into_iter()
                .filter_map(|i| self.check_name(ctx, &line.tokens[i], "loop variable", true))
                .collect();
        }

        let Some(assignment) = Assignment::parse(line) else {
            return Vec::new();
        };
        let state = ctx.state;
        let module_level = line.indent.width == 0;
        assignment
            .targets
            .iter()
            .filter_map(|&i| {
                let token = &line.tokens[i];
                let name = line.token_text(token);
                if state.at_namespace_scope() && is_all_caps(name) {
                    return None;
                }
                if module_level && state.bindings.is_constant_candidate(name) {
                    return None;
                }
                self.check_name(ctx, token, "variable", in_loop)
            })
            .collect()
    }
}


/// Class names are `CapWords`.
#[derive(Debug, Clone, Default)]
pub struct NamingClass;

impl NamingClass {
    /// Rule id.
    pub const NAME: &'static str = "naming-class";
    /// Rule code.
    pub const CODE: &'static str = "PS502";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NamingClass {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn description(&self) -> &'static str {
        "Class names use CapWords"
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        if !is_code_statement(ctx) {
            return Vec::new();
        }
        let Some(i) = definition_name(ctx, "class") else {
            return Vec::new();
        };
        let token = &ctx.line.tokens[i];
        let name = ctx.line.token_text(token);
        if is_cap_words(name) {
            return Vec::new();
        }
        vec![Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.token_location(token),
            format!("class name `{name}` is not CapWords"),
        )]
    }
}

/// Module-level names bound once to a literal are `ALL_CAPS`, and
/// constants are never rebound.
#[derive(Debug, Clone, Default)]
pub struct NamingConstant;

impl NamingConstant {
    /// Rule id.
    pub const NAME: &'static str = "naming-constant";
    /// Rule code.
    pub const CODE: &'static str = "PS503";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NamingConstant {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn description(&self) -> &'static str {
        "Module constants use ALL_CAPS and are never reassigned"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        if !is_code_statement(ctx) {
            return Vec::new();
        }
        let line = ctx.line;
        let bindings = &ctx.state.bindings;
        let mut violations = Vec::new();

        for name in bindings.bound_on(line.number) {
            let all = bindings.bindings(name);
            let Some(first) = all.first() else { continue };

            let message = if first.line == line.number {
                if all.len() != 1 || !first.literal || is_all_caps(name) || is_dunder(name) {
                    continue;
                }
                format!("module constant `{name}` should be ALL_CAPS")
            } else if first.literal && is_all_caps(name) {
                format!("constant `{name}` is reassigned (first bound on line {})", first.line)
            } else {
                continue;
            };

            let location = line
                .tokens
                .iter()
                .find(|t| t.kind == TokenKind::Name && line.token_text(t) == name)
                .map_or_else(|| ctx.line_location(), |t| ctx.token_location(t));
            violations.push(Violation::new(
                Self::CODE,
                Self::NAME,
                self.category(),
                self.default_severity(),
                location,
                message,
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    #[test]
    fn test_case_helpers() {
        assert!(is_snake_case("get_data"));
        assert!(is_snake_case("_private2"));
        assert!(!is_snake_case("getData"));
        assert!(is_all_caps("MAX_RETRIES"));
        assert!(!is_all_caps("_"));
        assert!(is_cap_words("HTTPServer"));
        assert!(is_cap_words("_Base"));
        assert!(!is_cap_words("my_class"));
        assert_eq!(to_snake_case("getUserName"), "get_user_name");
    }

    #[test]
    fn test_camel_case_function_flagged() {
        let violations = check(NamingFunction::new(), "def getData():\n    return 1\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, Some(5));
        assert_eq!(
            violations[0].message,
            "function name `getData` is not lower_case_with_underscores"
        );
    }

    #[test]
    fn test_snake_case_and_dunder_pass() {
        let src = "class Item:\n    def __init__(self):\n        self.userName = 1\n\n    async def get_data(self):\n        return 1\n";
        assert!(check(NamingFunction::new(), src).is_empty());
    }

    #[test]
    fn test_camel_case_variable_flagged() {
        let violations = check(NamingFunction::new(), "userName = compute()\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.starts_with("variable name `userName`"));
    }

    #[test]
    fn test_all_caps_accepted_at_namespace_scope_only() {
        assert!(check(NamingFunction::new(), "class Config:\n    DEBUG = compute()\n").is_empty());
        let violations = check(NamingFunction::new(), "def load():\n    DEBUG = True\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn test_single_letters_only_in_loops() {
        let src = "for i in range(3):\n    j = i * 2\n";
        assert!(check(NamingFunction::new(), src).is_empty());

        let violations = check(NamingFunction::new(), "def area():\n    w = compute()\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "single-letter variable name `w` outside a loop"
        );
    }

    #[test]
    fn test_parameters_checked() {
        let violations = check(NamingFunction::new(), "def area(w, h):\n    return w * h\n");
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "single-letter parameter name `w` outside a loop",
                "single-letter parameter name `h` outside a loop",
            ]
        );
        assert_eq!(violations[0].location.column, Some(10));

        let violations = check(NamingFunction::new(), "def load(self, userName):\n    pass\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "parameter name `userName` is not lower_case_with_underscores"
        );
    }

    #[test]
    fn test_parameter_markers_annotations_and_defaults() {
        let src = "def run(first, *, mode: Dict[str, int] = None, **extra_args):\n    pass\n";
        assert!(check(NamingFunction::new(), src).is_empty());

        let violations = check(NamingFunction::new(), "def run(items, *argList, b=1):\n    pass\n");
        let names: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "parameter name `argList` is not lower_case_with_underscores",
                "single-letter parameter name `b` outside a loop",
            ]
        );
    }

    #[test]
    fn test_multiline_signature_parameters() {
        let src = "def run(\n    first,\n    secondValue: int = 2,\n) -> None:\n    pass\n";
        let violations = check(NamingFunction::new(), src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 3);
        assert!(violations[0].message.contains("`secondValue`"));
    }

    #[test]
    fn test_function_in_loop_still_checks_parameters() {
        let src = "for name in names:\n    def show(x):\n        return x\n";
        let violations = check(NamingFunction::new(), src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "single-letter parameter name `x` outside a loop");
    }

    #[test]
    fn test_loop_inside_function_body_is_a_loop_scope() {
        let src = "def total(items):\n    for item in items:\n        n = item\n    return n\n";
        assert!(check(NamingFunction::new(), src).is_empty());
    }

    #[test]
    fn test_ambiguous_names_always_flagged() {
        let violations = check(NamingFunction::new(), "for l in lines:\n    pass\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "ambiguous loop variable name `l`");
    }

    #[test]
    fn test_underscore_allowed() {
        assert!(check(NamingFunction::new(), "_ = compute()\n").is_empty());
    }

    #[test]
    fn test_module_constant_candidate_left_to_constant_rule() {
        assert!(check(NamingFunction::new(), "maxRetries = 5\n").is_empty());
    }

    #[test]
    fn test_class_names() {
        let violations = check(NamingClass::new(), "class myClass:\n    pass\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, Some(7));
        assert_eq!(violations[0].message, "class name `myClass` is not CapWords");

        assert!(check(NamingClass::new(), "class MyClass(Base):\n    pass\n").is_empty());
    }

    #[test]
    fn test_untouched_constant_passes() {
        assert!(check(NamingConstant::new(), "MAX_RETRIES = 5\n").is_empty());
    }

    #[test]
    fn test_lowercase_constant_flagged() {
        let violations = check(NamingConstant::new(), "max_retries = 5\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(
            violations[0].message,
            "module constant `max_retries` should be ALL_CAPS"
        );
    }

    #[test]
    fn test_reassigned_lowercase_is_a_variable() {
        assert!(check(NamingConstant::new(), "retries = 5\nretries = 6\n").is_empty());
    }

    #[test]
    fn test_reassigned_constant_flagged() {
        let src = "MAX_RETRIES = 5\n\n\ndef bump():\n    global MAX_RETRIES\n    MAX_RETRIES = 6\n";
        let violations = check(NamingConstant::new(), src);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 6);
        assert_eq!(violations[0].location.column, Some(5));
        assert_eq!(
            violations[0].message,
            "constant `MAX_RETRIES` is reassigned (first bound on line 1)"
        );
    }

    #[test]
    fn test_global_read_keeps_constant() {
        let src = "MAX_RETRIES = 5\n\n\ndef show():\n    global MAX_RETRIES\n    print(MAX_RETRIES)\n";
        assert!(check(NamingConstant::new(), src).is_empty());
    }

    #[test]
    fn test_dunder_and_computed_values_skipped() {
        let src = "__version__ = '1.0'\nlogger = get_logger()\n";
        assert!(check(NamingConstant::new(), src).is_empty());
    }
}
