//! Rule presets and configuration-driven rule construction.

use std::fmt;
use std::str::FromStr;

use pepcheck_core::{Config, Evaluator, EvaluatorBuilder, RuleBox, RuleConfigurationError};
use tracing::debug;

use crate::{
    BlankLinesMethod, BlankLinesTop, CommentFormat, DocstringQuotes, ImportGroupOrder,
    ImportOnePerLine, IndentWidth, LineLength, NamingClass, NamingConstant, NamingFunction,
    NoBackslashContinuation, NoBoolLiteralCompare, NoMultiBlank, NoWildcardImport, UseIsForNone,
    WhitespaceBrackets, WhitespaceCall, WhitespacePunct,
};

/// Preset configurations for pepcheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// The full catalog.
    #[default]
    Pep8,
    /// Layout-only rules: indentation, line length, blank lines and
    /// whitespace.
    Layout,
}

impl Preset {
    /// Every preset, in display order.
    pub const ALL: [Self; 2] = [Self::Pep8, Self::Layout];

    /// Returns the preset's configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pep8 => "pep8",
            Self::Layout => "layout",
        }
    }

    /// Returns the rules for this preset with default options.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Pep8 => all_rules(),
            Self::Layout => layout_rules(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = RuleConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RuleConfigurationError::UnknownPreset {
                name: s.to_string(),
                valid: Self::ALL.map(Self::name).join(", "),
            })
    }
}

/// Returns every rule in catalog order.
///
/// Catalog order is the tie-breaker when two violations share a position,
/// so it must stay stable.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(IndentWidth::new()),
        Box::new(LineLength::new()),
        Box::new(BlankLinesTop::new()),
        Box::new(BlankLinesMethod::new()),
        Box::new(NoMultiBlank::new()),
        Box::new(ImportOnePerLine::new()),
        Box::new(ImportGroupOrder::new()),
        Box::new(NamingFunction::new()),
        Box::new(NamingClass::new()),
        Box::new(NamingConstant::new()),
        Box::new(WhitespaceBrackets::new()),
        Box::new(WhitespacePunct::new()),
        Box::new(WhitespaceCall::new()),
        Box::new(CommentFormat::new()),
        Box::new(DocstringQuotes::new()),
        Box::new(NoWildcardImport::new()),
        Box::new(NoBoolLiteralCompare::new()),
        Box::new(UseIsForNone::new()),
        Box::new(NoBackslashContinuation::new()),
    ]
}

/// Returns the layout rules: indentation, line length, blank lines and
/// whitespace.
#[must_use]
pub fn layout_rules() -> Vec<RuleBox> {
    vec![
        Box::new(IndentWidth::new()),
        Box::new(LineLength::new()),
        Box::new(BlankLinesTop::new()),
        Box::new(BlankLinesMethod::new()),
        Box::new(NoMultiBlank::new()),
        Box::new(WhitespaceBrackets::new()),
        Box::new(WhitespacePunct::new()),
        Box::new(WhitespaceCall::new()),
    ]
}

/// Returns the ids of every catalog rule, in catalog order.
#[must_use]
pub fn rule_ids() -> Vec<&'static str> {
    all_rules().iter().map(|r| r.name()).collect()
}

/// Builds the rule set a configuration asks for.
///
/// Picks the configured preset (default `pep8`) and applies rule options.
/// Enabling, disabling and severity overrides are left to the evaluator.
///
/// # Errors
///
/// Returns an error if the preset is unknown or a rule option is invalid.
pub fn configured_rules(config: &Config) -> Result<Vec<RuleBox>, RuleConfigurationError> {
    let preset = config
        .preset
        .as_deref()
        .map(str::parse::<Preset>)
        .transpose()?
        .unwrap_or_default();
    debug!("Using preset: {}", preset);

    let mut rules = preset.rules();
    for rule in &mut rules {
        let Some(rule_config) = config.rules.get(rule.name()) else {
            continue;
        };
        match rule.name() {
            LineLength::NAME => {
                let mut configured = LineLength::new();
                if let Some(limit) = rule_config.positive_int(LineLength::NAME, "max_line_length")? {
                    configured = configured.max_line_length(limit);
                }
                if let Some(limit) = rule_config.positive_int(LineLength::NAME, "max_doc_length")? {
                    configured = configured.max_doc_length(limit);
                }
                *rule = Box::new(configured);
            }
            IndentWidth::NAME => {
                if let Some(width) = rule_config.positive_int(IndentWidth::NAME, "width")? {
                    *rule = Box::new(IndentWidth::new().width(width));
                }
            }
            _ => {}
        }
    }
    Ok(rules)
}

/// Returns an evaluator builder for a configuration.
///
/// Every catalog id is declared known, so configuring a rule that the
/// chosen preset leaves out is not an error.
///
/// # Errors
///
/// Returns an error if the preset is unknown or a rule option is invalid.
pub fn evaluator_builder(config: &Config) -> Result<EvaluatorBuilder, RuleConfigurationError> {
    Ok(Evaluator::builder()
        .rules(configured_rules(config)?)
        .known_rules(rule_ids())
        .config(config.clone()))
}

/// Builds an evaluator for a configuration.
///
/// # Errors
///
/// Returns an error if the preset is unknown, a rule option is invalid or
/// the configuration references an unknown rule.
pub fn evaluator_for(config: &Config) -> Result<Evaluator, RuleConfigurationError> {
    evaluator_builder(config)?.build()
}
