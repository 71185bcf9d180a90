use crate::fuzzy::LinguisticVariable;
use std::collections::HashMap;

/// Why a query parameter was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// Parameter was absent.
    Missing,
    /// Parameter could not be parsed as a finite number.
    NotANumber,
    /// Parameter was neither a number nor a term of the variable it feeds.
    UnknownTerm {
        /// Variable whose terms were searched.
        variable: String,
        /// Terms that would have been accepted.
        expected: Vec<String>,
    },
}

/// A single rejected query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterIssue {
    /// Query parameter name.
    pub parameter: &'static str,
    /// Raw value supplied by the client, if any.
    pub input: Option<String>,
    /// Reason for the rejection.
    pub kind: IssueKind,
}

impl ParameterIssue {
    /// Machine-readable error type.
    pub fn code(&self) -> &'static str {
        match self.kind {
            IssueKind::Missing => "missing",
            IssueKind::NotANumber => "float_parsing",
            IssueKind::UnknownTerm { .. } => "unknown_term",
        }
    }

    /// Human-readable explanation.
    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::Missing => "Field required".to_string(),
            IssueKind::NotANumber => {
                "Input should be a valid finite number, unable to parse string as a number"
                    .to_string()
            }
            IssueKind::UnknownTerm { variable, expected } => format!(
                "Unknown term '{}' for '{variable}'; expected a number or one of: {}",
                self.input.as_deref().unwrap_or_default(),
                expected.join(", ")
            ),
        }
    }
}

/// Raw query parameters of a prediction request.
#[derive(Debug, Clone, Copy)]
pub struct QueryParams<'a>(pub &'a HashMap<String, String>);

impl<'a> QueryParams<'a> {
    /// Raw value of a required parameter, recording an issue when it is absent.
    pub(crate) fn required(
        &self,
        name: &'static str,
        issues: &mut Vec<ParameterIssue>,
    ) -> Option<&'a str> {
        let value = self.0.get(name).map(String::as_str);
        if value.is_none() {
            issues.push(ParameterIssue {
                parameter: name,
                input: None,
                kind: IssueKind::Missing,
            });
        }
        value
    }

    /// Required parameter parsed as a finite float.
    pub(crate) fn number(
        &self,
        name: &'static str,
        issues: &mut Vec<ParameterIssue>,
    ) -> Option<f64> {
        let raw = self.required(name, issues)?;
        let value = parse_number(raw);
        if value.is_none() {
            issues.push(ParameterIssue {
                parameter: name,
                input: Some(raw.to_string()),
                kind: IssueKind::NotANumber,
            });
        }
        value
    }

    /// Required parameter given either as a number or as a term of `variable`.
    ///
    /// Numbers take precedence; otherwise the value is looked up as a term name and resolved to
    /// the term's representative value.
    pub(crate) fn number_or_term(
        &self,
        name: &'static str,
        variable: &LinguisticVariable,
        issues: &mut Vec<ParameterIssue>,
    ) -> Option<f64> {
        let raw = self.required(name, issues)?;
        if let Some(value) = parse_number(raw) {
            return Some(value);
        }
        let resolved = variable.representative_value(raw.trim());
        if resolved.is_none() {
            issues.push(ParameterIssue {
                parameter: name,
                input: Some(raw.to_string()),
                kind: IssueKind::UnknownTerm {
                    variable: variable.name.clone(),
                    expected: variable
                        .term_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                },
            });
        }
        resolved
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
