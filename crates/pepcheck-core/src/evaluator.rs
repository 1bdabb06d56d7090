//! Rule evaluator: the single forward pass over a scanned file.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::{Config, RuleConfigurationError};
use crate::context::LineContext;
use crate::imports::ImportClassifier;
use crate::report::{aggregate, Report};
use crate::rule::{Rule, RuleBox};
use crate::scanner::{scan, scan_str, EncodingError, EncodingHint};
use crate::source::SourceFile;
use crate::state::EvaluationState;
use crate::types::{Category, Location, Severity, Violation};
use crate::utils::allowance::check_allow_with_reason;

/// Rule id of the diagnostic emitted for malformed but decodable input.
pub const MALFORMED_INPUT: &str = "malformed-input";

/// Code of the malformed-input diagnostic.
pub const MALFORMED_INPUT_CODE: &str = "PS000";

/// Builder for configuring an [`Evaluator`].
#[derive(Default)]
pub struct EvaluatorBuilder {
    rules: Vec<RuleBox>,
    known_rules: Vec<String>,
    config: Option<Config>,
    local_packages: Vec<String>,
    encoding: EncodingHint,
    parallelism: Option<usize>,
}

impl EvaluatorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the evaluator. Rules run and tie-break in the order
    /// they are added.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the evaluator.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Declares rule ids that configuration may reference even though
    /// they are not part of this evaluator (e.g. rules left out by a preset).
    #[must_use]
    pub fn known_rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_rules.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds top-level packages treated as local imports.
    #[must_use]
    pub fn local_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_packages
            .extend(packages.into_iter().map(Into::into));
        self
    }

    /// Sets how encoding declarations are treated for byte input.
    #[must_use]
    pub fn encoding_hint(mut self, hint: EncodingHint) -> Self {
        self.encoding = hint;
        self
    }

    /// Sets the number of worker threads for batch evaluation.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the evaluator, filtering rules by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RuleConfigurationError::UnknownRule`] if the configuration
    /// references a rule id that is neither registered nor declared known.
    pub fn build(self) -> Result<Evaluator, RuleConfigurationError> {
        let config = self.config.unwrap_or_default();

        let known: HashSet<&str> = self
            .rules
            .iter()
            .map(|r| r.name())
            .chain(self.known_rules.iter().map(String::as_str))
            .chain(std::iter::once(MALFORMED_INPUT))
            .collect();
        let mut referenced: Vec<&String> = config.rules.keys().collect();
        referenced.sort();
        if let Some(unknown) = referenced.into_iter().find(|id| !known.contains(id.as_str())) {
            return Err(RuleConfigurationError::UnknownRule { id: unknown.clone() });
        }

        let mut overrides = HashMap::new();
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in self.rules {
            if !config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            if let Some(severity) = config.rule_severity(rule.name()) {
                overrides.insert(rule.name().to_string(), severity);
            }
            rules.push(rule);
        }

        let malformed_severity = config
            .is_rule_enabled(MALFORMED_INPUT)
            .then(|| config.rule_severity(MALFORMED_INPUT).unwrap_or(Severity::Warning));

        let mut local_packages = self.local_packages;
        local_packages.extend(config.local_packages());

        Ok(Evaluator {
            rules,
            overrides,
            malformed_severity,
            classifier: ImportClassifier::new().with_local_packages(local_packages),
            encoding: self.encoding,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
        })
    }
}

/// Runs a fixed rule set over scanned files.
///
/// The rule set is read-only after construction, so one evaluator can be
/// shared by any number of threads. Each call to [`Evaluator::evaluate`]
/// owns its own [`EvaluationState`].
pub struct Evaluator {
    rules: Vec<RuleBox>,
    overrides: HashMap<String, Severity>,
    malformed_severity: Option<Severity>,
    classifier: ImportClassifier,
    pub(crate) encoding: EncodingHint,
    pub(crate) parallelism: Option<usize>,
}

impl Evaluator {
    /// Creates a new builder for configuring an evaluator.
    #[must_use]
    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    /// Creates an evaluator that runs `rules` with default settings and no
    /// configuration.
    #[must_use]
    pub fn new(rules: Vec<RuleBox>) -> Self {
        Self {
            rules,
            overrides: HashMap::new(),
            malformed_severity: Some(Severity::Warning),
            classifier: ImportClassifier::new(),
            encoding: EncodingHint::default(),
            parallelism: None,
        }
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the ids of the active rules in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluates a scanned file and returns its violations ordered by
    /// (line, column, catalog order).
    #[must_use]
    pub fn evaluate(&self, file: &SourceFile) -> Vec<Violation> {
        debug!("Evaluating: {} ({} lines)", file.identifier, file.lines.len());

        let (stateful, per_line): (Vec<usize>, Vec<usize>) =
            (0..self.rules.len()).partition(|&i| self.rules[i].is_stateful());

        let mut state = EvaluationState::new(file, self.classifier.clone());
        let mut ranked: Vec<(usize, Violation)> = Vec::new();

        for line in &file.lines {
            state.begin_line(line);
            let ctx = LineContext::new(file, line, &state);
            for &rank in per_line.iter().chain(&stateful) {
                ranked.extend(self.rules[rank].check(&ctx).into_iter().map(|v| (rank, v)));
            }
            state.end_line(line);
        }

        if let (Some(malformed), Some(severity)) = (file.malformed, self.malformed_severity) {
            let last = file.last_line_number();
            ranked.push((
                usize::MAX,
                Violation::new(
                    MALFORMED_INPUT_CODE,
                    MALFORMED_INPUT,
                    Category::Other,
                    severity,
                    Location::line(&file.identifier, last),
                    format!("malformed input: {malformed}"),
                ),
            ));
        }

        ranked.retain(|(_, v)| {
            let allowed = check_allow_with_reason(file, v.location.line, &v.rule, &v.code);
            if let Some(reason) = allowed.reason() {
                debug!("Allowed {} at {}:{} ({reason})", v.rule, file.identifier, v.location.line);
            }
            !allowed.is_allowed()
        });

        for (_, violation) in &mut ranked {
            if let Some(&severity) = self.overrides.get(&violation.rule) {
                violation.severity = severity;
            }
        }

        ranked.sort_by_key(|(rank, v)| (v.position(), *rank));
        ranked.into_iter().map(|(_, v)| v).collect()
    }

    /// Evaluates text that is already decoded and aggregates the result.
    #[must_use]
    pub fn evaluate_source(&self, text: &str, identifier: &str) -> Report {
        let file = scan_str(text, identifier);
        aggregate(identifier, self.evaluate(&file))
    }

    /// Decodes, scans and evaluates raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the bytes cannot be decoded; no partial
    /// report is produced in that case.
    pub fn evaluate_bytes(&self, bytes: &[u8], identifier: &str) -> Result<Report, EncodingError> {
        let file = scan(bytes, identifier, self.encoding)?;
        Ok(aggregate(identifier, self.evaluate(&file)))
    }
}
