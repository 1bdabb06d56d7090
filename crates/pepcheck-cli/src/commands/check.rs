//! Check command implementation.

use anyhow::{bail, Context, Result};
use glob::Pattern;
use pepcheck_core::{AnalyzerConfig, CancellationFlag, Config, SourceInput};
use pepcheck_rules::{all_rules, evaluator_for, rule_ids, Preset};
use std::path::{Path, PathBuf};

use super::output;
use crate::config_resolver;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    paths: &[PathBuf],
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let project_dir = paths
        .first()
        .map_or_else(|| PathBuf::from("."), |p| project_dir(p));
    let source = config_resolver::resolve(&project_dir, config_path);
    let mut config = source.load()?;
    config.analyzer.exclude.extend(exclude);

    if let Some(filter) = rules_filter {
        let selected = select_rules(&filter)?;
        apply_rule_filter(&mut config, &selected);
    }

    let evaluator = evaluator_for(&config).context("Invalid rule configuration")?;
    let files = discover_files(paths, &config.analyzer)?;
    tracing::info!(
        "Checking {} files with {} rules",
        files.len(),
        evaluator.rule_count()
    );

    let inputs = files
        .iter()
        .map(|path| read_input(path))
        .collect::<Result<Vec<_>>>()?;
    let result = evaluator.evaluate_batch(&inputs, &CancellationFlag::new());

    output::print(&result, format, &inputs)?;

    if result.has_violations_at(config.fail_threshold()) || !result.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Directory whose config applies to `path`.
fn project_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Resolves a comma-separated list of rule ids or codes.
fn select_rules(filter: &str) -> Result<Vec<&'static str>> {
    let rules = all_rules();
    filter
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            rules
                .iter()
                .find(|r| r.name() == item || r.code().eq_ignore_ascii_case(item))
                .map(|r| r.name())
                .with_context(|| {
                    format!("Unknown rule `{item}`. Run `pepcheck list-rules` to see available rules")
                })
        })
        .collect()
}

/// Enables exactly the selected rules, whatever the configured preset.
fn apply_rule_filter(config: &mut Config, selected: &[&str]) {
    config.preset = Some(Preset::Pep8.name().to_string());
    for id in rule_ids() {
        config.set_enabled(id, selected.contains(&id));
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid glob pattern: {p}")))
        .collect()
}

fn is_excluded(path: &Path, exclude: &[Pattern]) -> bool {
    exclude.iter().any(|p| p.matches_path(path))
}

/// Finds the files to check under `paths`.
///
/// Explicit file arguments are always checked; directories are walked with
/// the include and exclude globs applied to paths relative to the root.
fn discover_files(paths: &[PathBuf], analyzer: &AnalyzerConfig) -> Result<Vec<PathBuf>> {
    let include = if analyzer.include.is_empty() {
        compile_patterns(&["**/*.py".to_string()])?
    } else {
        compile_patterns(&analyzer.include)?
    };
    let exclude = compile_patterns(&analyzer.exclude)?;

    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            bail!("Path does not exist: {}", root.display());
        }

        let walker = ignore::WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(analyzer.respect_gitignore)
            .git_exclude(analyzer.respect_gitignore)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            if include.iter().any(|p| p.matches_path(relative)) && !is_excluded(relative, &exclude) {
                files.push(path.to_path_buf());
            } else {
                tracing::debug!("Skipping {}", path.display());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn read_input(path: &Path) -> Result<SourceInput> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(SourceInput::new(path.display().to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/sub")).unwrap();
        fs::create_dir_all(root.join(".venv/lib")).unwrap();
        fs::write(root.join("main.py"), "x = 1\n").unwrap();
        fs::write(root.join("pkg/models.py"), "").unwrap();
        fs::write(root.join("pkg/sub/views.py"), "").unwrap();
        fs::write(root.join("pkg/notes.txt"), "").unwrap();
        fs::write(root.join(".venv/lib/site.py"), "").unwrap();
        dir
    }

    #[test]
    fn discovers_python_files_and_applies_default_excludes() {
        let dir = tree();
        let files = discover_files(&[dir.path().to_path_buf()], &AnalyzerConfig::default()).unwrap();
        assert_eq!(
            names(dir.path(), &files),
            vec!["main.py", "pkg/models.py", "pkg/sub/views.py"]
        );
    }

    #[test]
    fn custom_include_and_exclude() {
        let dir = tree();
        let analyzer = AnalyzerConfig {
            include: vec!["pkg/**/*.py".to_string()],
            exclude: vec!["**/sub/**".to_string()],
            ..AnalyzerConfig::default()
        };
        let files = discover_files(&[dir.path().to_path_buf()], &analyzer).unwrap();
        assert_eq!(names(dir.path(), &files), vec!["pkg/models.py"]);
    }

    #[test]
    fn explicit_files_are_always_checked() {
        let dir = tree();
        let notes = dir.path().join("pkg/notes.txt");
        let files = discover_files(&[notes.clone()], &AnalyzerConfig::default()).unwrap();
        assert_eq!(files, vec![notes]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_files(&[missing], &AnalyzerConfig::default()).is_err());
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let dir = tree();
        let analyzer = AnalyzerConfig {
            exclude: vec!["[".to_string()],
            ..AnalyzerConfig::default()
        };
        let err = discover_files(&[dir.path().to_path_buf()], &analyzer).unwrap_err();
        assert!(err.to_string().contains("Invalid glob pattern"));
    }

    #[test]
    fn rule_filter_accepts_ids_and_codes() {
        assert_eq!(
            select_rules("line-length, ps101").unwrap(),
            vec!["line-length", "indent-width"]
        );
        let err = select_rules("PS999").unwrap_err();
        assert!(err.to_string().contains("Unknown rule `PS999`"));
    }

    #[test]
    fn rule_filter_enables_only_the_selection() {
        let mut config = Config::parse("preset = \"layout\"\n[rules.use-is-for-none]\nenabled = false\n").unwrap();
        apply_rule_filter(&mut config, &["use-is-for-none"]);

        let evaluator = evaluator_for(&config).unwrap();
        assert_eq!(evaluator.rule_names(), vec!["use-is-for-none"]);
    }

    #[test]
    fn project_dir_of_a_file_is_its_parent() {
        assert_eq!(project_dir(Path::new("main.py")), PathBuf::from("."));
        assert_eq!(project_dir(Path::new("pkg/main.py")), PathBuf::from("pkg"));
    }
}
