//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! x = compute() == None  # pepcheck: allow(use-is-for-none) reason="numpy array"
//! ```
//!
//! A directive applies to its own line. A directive on a line of its own
//! also covers the line directly below it.

use std::collections::HashSet;

use crate::source::SourceFile;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Rule ids or codes that are allowed.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    /// Returns true if the directive covers the rule.
    #[must_use]
    pub fn covers(&self, rule_name: &str, rule_code: &str) -> bool {
        self.rules.contains("all") || self.rules.contains(rule_name) || self.rules.contains(rule_code)
    }
}

/// Checks a scanned file for an allowance directive covering a rule.
///
/// Looks at the comment on `line` and at a standalone comment on the line
/// before it. Only real comments count; a `#` inside a string literal is
/// ignored.
#[must_use]
pub fn check_allow_with_reason(
    file: &SourceFile,
    line: usize,
    rule_name: &str,
    rule_code: &str,
) -> AllowCheck {
    // (line, whether the comment must be the only thing on it)
    for (check_line, standalone) in [(line.saturating_sub(1), true), (line, false)] {
        let Some(source_line) = file.line(check_line) else {
            continue;
        };
        let Some((index, comment)) = source_line.comment() else {
            continue;
        };
        if standalone && index != 0 {
            continue;
        }
        if let Some(directive) = parse_allow_directive(source_line.token_text(comment)) {
            if directive.covers(rule_name, rule_code) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from comment text (starting at `#`).
#[must_use]
pub fn parse_allow_directive(comment: &str) -> Option<AllowDirective> {
    let comment_content = comment.trim().strip_prefix('#')?.trim();

    let directive = comment_content.strip_prefix("pepcheck:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules_str = &allow_content[..paren_end];

    let rules: HashSet<String> = rules_str
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_str;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("# pepcheck: allow(line-length)").unwrap();
        assert!(directive.rules.contains("line-length"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive =
            parse_allow_directive("# pepcheck: allow(use-is-for-none) reason=\"numpy mask\"")
                .unwrap();
        assert!(directive.rules.contains("use-is-for-none"));
        assert_eq!(directive.reason, Some("numpy mask".to_string()));
    }

    #[test]
    fn test_parse_multiple_rules() {
        let directive =
            parse_allow_directive("#pepcheck: allow(naming-function, PS201, all)").unwrap();
        assert_eq!(directive.rules.len(), 3);
        assert!(directive.covers("anything", "PS000"));
    }

    #[test]
    fn test_rejects_other_comments() {
        assert!(parse_allow_directive("# regular comment").is_none());
        assert!(parse_allow_directive("# pepcheck: allow()").is_none());
        assert!(parse_allow_directive("# noqa: E501").is_none());
    }

    #[test]
    fn test_check_allow_same_line_and_line_above() {
        let file = scan_str(
            "x = 1  # pepcheck: allow(whitespace-punct)\n# pepcheck: allow(PS501) reason=\"legacy\"\nfooBar = 2\nother = 3\n",
            "t.py",
        );

        assert!(check_allow_with_reason(&file, 1, "whitespace-punct", "PS602").is_allowed());
        let result = check_allow_with_reason(&file, 3, "naming-function", "PS501");
        assert_eq!(result.reason(), Some("legacy"));
        assert!(!check_allow_with_reason(&file, 4, "naming-function", "PS501").is_allowed());
        assert!(!check_allow_with_reason(&file, 1, "line-length", "PS201").is_allowed());
    }

    #[test]
    fn test_trailing_directive_covers_only_its_line() {
        let file = scan_str(
            "fooBar = 1  # pepcheck: allow(naming-function)
bazQux = 2
",
            "t.py",
        );
        assert!(check_allow_with_reason(&file, 1, "naming-function", "PS501").is_allowed());
        assert!(!check_allow_with_reason(&file, 2, "naming-function", "PS501").is_allowed());
    }

    #[test]
    fn test_directive_inside_string_is_ignored() {
        let file = scan_str("s = '# pepcheck: allow(all)' == None\n", "t.py");
        assert_eq!(
            check_allow_with_reason(&file, 1, "use-is-for-none", "PS902"),
            AllowCheck::Denied
        );
    }
}
