//! End-to-end behaviour of the default catalog.

use insta::assert_snapshot;
use pepcheck::rules::rule_ids;
use pepcheck::{evaluate_source, evaluate_source_with, Config, Report, Severity};

const FIXTURE: &str = r#""""Product page object."""
import re, os
from playwright.sync_api import *

from pages.base_page import BasePage
class productPage(BasePage):
    def __init__( self, page ):
        super().__init__ (page)
        self.cheapest = None



    def pickCheapest(self, items):
        #find the cheapest item
        for x in items:
            if self.cheapest == None or x.price < self.cheapest.price:
                self.cheapest = x
        return self.cheapest != None and self.cheapest.enabled == True


max_price = 500
total = 1 + \
    2
"#;

fn rules_fired(report: &Report) -> Vec<&str> {
    report.violations.iter().map(|v| v.rule.as_str()).collect()
}

fn lines_of<'a>(report: &'a Report, rule: &'a str) -> Vec<usize> {
    report.violations_of(rule).map(|v| v.location.line).collect()
}

#[test]
fn every_prefix_produces_a_report() {
    for (end, _) in FIXTURE.char_indices() {
        let report = evaluate_source(&FIXTURE[..end], "prefix.py");
        assert_eq!(report.total, report.violations.len());
    }
}

#[test]
fn evaluation_is_idempotent() {
    let first = serde_json::to_string(&evaluate_source(FIXTURE, "product_page.py")).unwrap();
    let second = serde_json::to_string(&evaluate_source(FIXTURE, "product_page.py")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn disabling_a_rule_only_removes_its_violations() {
    let full = evaluate_source(FIXTURE, "product_page.py");
    for id in rule_ids() {
        let mut config = Config::default();
        config.set_enabled(id, false);
        let without = evaluate_source_with(FIXTURE, "product_page.py", &config).unwrap();

        let expected: Vec<_> = full.violations.iter().filter(|v| v.rule != id).cloned().collect();
        assert_eq!(without.violations, expected, "disabling {id}");

        config.set_enabled(id, true);
        let restored = evaluate_source_with(FIXTURE, "product_page.py", &config).unwrap();
        assert_eq!(restored, full, "re-enabling {id}");
    }
}

#[test]
fn fixture_violations() {
    let report = evaluate_source(FIXTURE, "product_page.py");
    assert_eq!(lines_of(&report, "import-one-per-line"), vec![2]);
    assert_eq!(lines_of(&report, "no-wildcard-import"), vec![3]);
    assert_eq!(lines_of(&report, "blank-lines-top"), vec![6]);
    assert_eq!(lines_of(&report, "naming-class"), vec![6]);
    assert_eq!(lines_of(&report, "whitespace-brackets"), vec![7, 7]);
    assert_eq!(lines_of(&report, "whitespace-call"), vec![8]);
    assert_eq!(lines_of(&report, "no-multi-blank"), vec![12]);
    assert_eq!(lines_of(&report, "blank-lines-method"), vec![13]);
    assert_eq!(lines_of(&report, "naming-function"), vec![13]);
    assert_eq!(lines_of(&report, "comment-format"), vec![14]);
    assert_eq!(lines_of(&report, "use-is-for-none"), vec![16, 18]);
    assert_eq!(lines_of(&report, "no-bool-literal-compare"), vec![18]);
    assert_eq!(lines_of(&report, "naming-constant"), vec![21]);
    assert_eq!(lines_of(&report, "no-backslash-continuation"), vec![22]);
    assert!(!report.is_clean());
}

#[test]
fn report_counts_match_violations() {
    let report = evaluate_source(FIXTURE, "product_page.py");
    let warnings = report.count(Severity::Warning);
    let errors = report.count(Severity::Error);
    assert_eq!(warnings + errors, report.total);
    assert_eq!(report.by_category.values().sum::<usize>(), report.total);
}

#[test]
fn rendered_violations() {
    let src = "import os, sys\nfrom os.path import *\nif value == None:\n    pass\n";
    let report = evaluate_source(src, "app.py");
    let rendered: Vec<String> = report.violations.iter().map(ToString::to_string).collect();
    assert_snapshot!(rendered.join("\n"), @r"
    app.py:1:10: error [PS401] multiple modules on one import line (os, sys)
    app.py:2:21: error [PS403] wildcard import from `os.path`
    app.py:3:10: error [PS902] comparison to `None` should use `is`, not `==`
    ");
}

#[test]
fn malformed_input_is_a_warning_on_the_last_line() {
    let report = evaluate_source("NAME = 'unterminated\nprint(NAME)\n", "broken.py");
    let malformed: Vec<_> = report.violations_of("malformed-input").collect();
    assert_eq!(malformed.len(), 1);
    assert_eq!(malformed[0].location.line, 2);
    assert_eq!(malformed[0].severity, Severity::Warning);
    assert_eq!(
        malformed[0].message,
        "malformed input: unterminated string literal starting on line 1"
    );
}

#[test]
fn indentation_examples() {
    let report = evaluate_source("if ready:\n   start()\n", "t.py");
    assert_eq!(rules_fired(&report), vec!["indent-width"]);
    assert!(evaluate_source("if ready:\n        start()\n", "t.py").violations.is_empty());
}

#[test]
fn line_length_examples() {
    let code = |n: usize| format!("VALUE = '{}'\n", "x".repeat(n - 10));
    let comment = |n: usize| format!("# {}\n", "y".repeat(n - 2));
    assert!(evaluate_source(&code(79), "t.py").violations.is_empty());
    assert_eq!(rules_fired(&evaluate_source(&code(80), "t.py")), vec!["line-length"]);
    assert!(evaluate_source(&comment(72), "t.py").violations.is_empty());
    assert_eq!(rules_fired(&evaluate_source(&comment(73), "t.py")), vec!["line-length"]);
}

#[test]
fn blank_line_examples() {
    let one = evaluate_source("import os\n\ndef main():\n    pass\n", "t.py");
    assert_eq!(rules_fired(&one), vec!["blank-lines-top"]);
    let two = evaluate_source("import os\n\n\ndef main():\n    pass\n", "t.py");
    assert!(two.violations.is_empty());
    let three = evaluate_source("import os\n\n\n\nimport sys\n", "t.py");
    assert!(rules_fired(&three).contains(&"no-multi-blank"));
}

#[test]
fn import_examples() {
    let config = Config::parse("[rules.import-group-order]\nlocal_packages = [\"myapp\"]\n").unwrap();
    let ordered = "import os\n\nimport numpy\n\nfrom myapp import models\n";
    let report = evaluate_source_with(ordered, "t.py", &config).unwrap();
    assert!(report.violations.is_empty());

    let reversed = "from myapp import models\n\nimport numpy\n\nimport os\n";
    let report = evaluate_source_with(reversed, "t.py", &config).unwrap();
    assert_eq!(lines_of(&report, "import-group-order"), vec![3, 5]);
}

#[test]
fn whitespace_examples() {
    assert_eq!(
        rules_fired(&evaluate_source("foo( 42 )\n", "t.py")),
        vec!["whitespace-brackets", "whitespace-brackets"]
    );
    assert!(evaluate_source("foo(42)\n", "t.py").violations.is_empty());
    assert_eq!(rules_fired(&evaluate_source("foo (42)\n", "t.py")), vec!["whitespace-call"]);
}

#[test]
fn naming_examples() {
    assert_eq!(
        rules_fired(&evaluate_source("class myClass:\n    pass\n", "t.py")),
        vec!["naming-class"]
    );
    assert!(evaluate_source("class MyClass:\n    pass\n", "t.py").violations.is_empty());
    assert!(evaluate_source("MAX_RETRIES = 5\n", "t.py").violations.is_empty());

    let reassigned = evaluate_source("MAX_RETRIES = 5\nMAX_RETRIES = 6\n", "t.py");
    assert_eq!(lines_of(&reassigned, "naming-constant"), vec![2]);
}

#[test]
fn idiom_examples() {
    assert_eq!(
        rules_fired(&evaluate_source("if flag == True:\n    pass\n", "t.py")),
        vec!["no-bool-literal-compare"]
    );
    assert_eq!(
        rules_fired(&evaluate_source("if value == None:\n    pass\n", "t.py")),
        vec!["use-is-for-none"]
    );
    assert!(evaluate_source("if value is None:\n    pass\n", "t.py").violations.is_empty());
}

#[test]
fn unknown_rule_in_config_is_rejected_before_evaluation() {
    let config = Config::parse("[rules.no-such-rule]\nenabled = false\n").unwrap();
    let err = evaluate_source_with("x = 1\n", "t.py", &config).unwrap_err();
    assert_eq!(err.to_string(), "unknown rule `no-such-rule`");
}

#[test]
fn evaluate_file_reads_and_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.py");
    std::fs::write(&good, "import os, sys\n").unwrap();
    let report = pepcheck::evaluate_file(&good, &Config::default()).unwrap();
    assert_eq!(report.total, 1);

    let bad = dir.path().join("bad.py");
    std::fs::write(&bad, b"name = '\xff'\n").unwrap();
    let err = pepcheck::evaluate_file(&bad, &Config::default()).unwrap_err();
    assert!(matches!(err, pepcheck::Error::Encoding { .. }));

    let missing = dir.path().join("missing.py");
    let err = pepcheck::evaluate_file(&missing, &Config::default()).unwrap_err();
    assert!(matches!(err, pepcheck::Error::Io { .. }));
}
