//! List rules command implementation.

use pepcheck_core::{MALFORMED_INPUT, MALFORMED_INPUT_CODE};
use pepcheck_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<7} {:<26} {:<12} {:<8} Description",
        "Code", "Name", "Category", "Severity"
    );
    println!("{}", "-".repeat(100));

    for rule in all_rules() {
        println!(
            "{:<7} {:<26} {:<12} {:<8} {}",
            rule.code(),
            rule.name(),
            rule.category(),
            rule.default_severity(),
            rule.description()
        );
    }
    println!(
        "{:<7} {:<26} {:<12} {:<8} Reported by the evaluator for unbalanced input",
        MALFORMED_INPUT_CODE, MALFORMED_INPUT, "other", "warning"
    );

    println!("\nPresets:");
    for preset in Preset::ALL {
        let codes: Vec<&str> = preset.rules().iter().map(|r| r.code()).collect();
        let default = if preset == Preset::default() { " (default)" } else { "" };
        println!("  {:<8} - {}{default}", preset.name(), codes.join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  pepcheck check --rules line-length,indent-width");
    println!("  pepcheck check --rules PS101,PS201");
}
