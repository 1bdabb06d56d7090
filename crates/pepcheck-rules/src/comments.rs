//! Comment formatting.

use pepcheck_core::{Category, LineContext, LineKind, Rule, Severity, Suggestion, Violation};

/// Block comments start with `# `; inline comments sit at least two
/// spaces after the code and also start with `# `.
#[derive(Debug, Clone, Default)]
pub struct CommentFormat;

impl CommentFormat {
    /// Rule id.
    pub const NAME: &'static str = "comment-format";
    /// Rule code.
    pub const CODE: &'static str = "PS701";

    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn violation(&self, ctx: &LineContext, byte: usize, message: &str) -> Violation {
        Violation::new(
            Self::CODE,
            Self::NAME,
            self.category(),
            self.default_severity(),
            ctx.location_at(byte, 1),
            message,
        )
    }
}

/// `# text`, a bare `#`, or a `#:` attribute doc comment.
fn starts_well(text: &str) -> bool {
    text == "#" || text.starts_with("# ") || text.starts_with("#:")
}

fn is_block_comment_ok(text: &str, line_number: usize) -> bool {
    starts_well(text)
        || (line_number == 1 && text.starts_with("#!"))
        || text.chars().all(|c| c == '#')
}

impl Rule for CommentFormat {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn category(&self) -> Category {
        Category::Comments
    }

    fn description(&self) -> &'static str {
        "Comments start with '# '; inline comments are two spaces from code"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &LineContext) -> Vec<Violation> {
        let line = ctx.line;
        let Some((index, comment)) = line.comment() else {
            return Vec::new();
        };
        let text = line.token_text(comment);

        if line.kind == LineKind::Comment || index == 0 {
            if is_block_comment_ok(text, line.number) {
                return Vec::new();
            }
            return vec![self
                .violation(ctx, comment.start, "block comment should start with `# `")
                .with_suggestion(Suggestion::new("Put one space after `#`"))];
        }

        let mut violations = Vec::new();
        if line.gap_before(index).is_some_and(|gap| gap < 2) {
            violations.push(
                self.violation(
                    ctx,
                    comment.start,
                    "inline comment should be preceded by at least two spaces",
                ),
            );
        }
        if !starts_well(text) {
            violations.push(self.violation(
                ctx,
                comment.start + 1,
                "inline comment should start with `# `",
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
    fn test_well_formed_comments_pass() {
        let src = "#!/usr/bin/env python\n# Setup.\n#\n#: documented attribute\n##########\nx = 1  # note\n";
        assert!(check(CommentFormat::new(), src).is_empty());
    }

    #[test]
    fn test_block_comment_without_space() {
        let violations = check(CommentFormat::new(), "x = 1\n#bad\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].location.column, Some(1));
    }

    #[test]
    fn test_shebang_only_on_first_line() {
        let violations = check(CommentFormat::new(), "x = 1\n#!/usr/bin/env python\n");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_inline_comment_too_close() {
        let violations = check(CommentFormat::new(), "x = 1 # note\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, Some(7));
        assert_eq!(
            violations[0].message,
            "inline comment should be preceded by at least two spaces"
        );
    }

    #[test]
    fn test_inline_comment_without_space_after_hash() {
        let violations = check(CommentFormat::new(), "x = 1 #note\n");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].location.column, Some(8));
        assert_eq!(violations[1].message, "inline comment should start with `# `");
    }

    #[test]
    fn test_inline_attribute_doc_comment_passes() {
        assert!(check(CommentFormat::new(), "timeout = 30  #: seconds\n").is_empty());
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        assert!(check(CommentFormat::new(), "color = '#fff'\n").is_empty());
    }

    #[test]
    fn test_indented_block_comment() {
        let src = "def run():\n    #todo\n    return 1\n";
        assert_eq!(check(CommentFormat::new(), src).len(), 1);
    }
}
