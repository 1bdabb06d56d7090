//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "pepcheck.toml";

const DEFAULT_CONFIG: &str = r#"# pepcheck configuration

# Rule preset: "pep8" (every rule) or "layout"
preset = "pep8"

# Lowest severity that makes `pepcheck check` exit non-zero
fail_on = "error"

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/.venv/**",
    "**/venv/**",
    "**/__pycache__/**",
    "**/build/**",
]

# Files to check (default: **/*.py)
# include = ["**/*.py"]

# Respect .gitignore files
respect_gitignore = true

# Worker threads for multi-file checks (default: all cores)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.line-length]
max_line_length = 79
max_doc_length = 72
# severity = "warning"  # Override default severity

[rules.indent-width]
width = 4

[rules.import-group-order]
# Top-level packages that belong to this project
local_packages = []

# [rules.naming-constant]
# enabled = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(CONFIG_FILE), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Run: pepcheck check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
