//! Output schema and corpus records
//!
//! `RootCauseAnalysis` is only ever built through [`RootCauseAnalysis::from_value`],
//! which checks every field in schema order and fails on the first violation.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::errors::RcaError;
use crate::errors::Result;

/// Classification of a ticket's underlying issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Bug,
    #[serde(rename = "UX gap")]
    UxGap,
    Performance,
    Misconfiguration,
    #[serde(rename = "User error")]
    UserError,
}

impl IssueType {
    pub const ALL: [Self; 5] = [
        Self::Bug,
        Self::UxGap,
        Self::Performance,
        Self::Misconfiguration,
        Self::UserError,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::UxGap => "UX gap",
            Self::Performance => "Performance",
            Self::Misconfiguration => "Misconfiguration",
            Self::UserError => "User error",
        }
    }

    /// Case-insensitive lookup of the canonical spelling
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and one-line description of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Fields the model is asked to produce, in schema order
pub const ANALYSIS_FIELDS: [FieldSpec; 9] = [
    FieldSpec {
        name: "summary",
        description: "A summary of the issue.",
    },
    FieldSpec {
        name: "category",
        description: "The category of the issue, e.g., 'Payment Failure', 'Login Issue'.",
    },
    FieldSpec {
        name: "root_cause",
        description: "The identified root cause of the issue, as a concise string.",
    },
    FieldSpec {
        name: "issue_type",
        description: "Classification of the issue, exactly one of: 'Bug', 'UX gap', 'Performance', 'Misconfiguration', 'User error'.",
    },
    FieldSpec {
        name: "severity",
        description: "The severity of the issue, exactly one of: 'High', 'Medium', 'Low'.",
    },
    FieldSpec {
        name: "confidence",
        description: "A confidence score in the analysis, a number between 0 and 1.",
    },
    FieldSpec {
        name: "engineering_actions",
        description: "A list of suggested actions for the engineering team.",
    },
    FieldSpec {
        name: "product_actions",
        description: "A list of suggested actions for the product team.",
    },
    FieldSpec {
        name: "support_reply_suggestion",
        description: "A suggested reply for the support team.",
    },
];

/// Validated root cause analysis of a single ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCauseAnalysis {
    pub summary: String,
    pub category: String,
    pub root_cause: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub confidence: f64,
    pub engineering_actions: Vec<String>,
    pub product_actions: Vec<String>,
    pub support_reply_suggestion: String,
    /// Identifiers of retrieved incidents; never taken from model output
    #[serde(default)]
    pub similar_incidents: Vec<String>,
}

impl RootCauseAnalysis {
    /// Validate a parsed model answer against the schema
    ///
    /// Any `similar_incidents` key in the input is ignored.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| RcaError::parse("expected a JSON object", value.to_string()))?;

        Ok(Self {
            summary: required_text(object, "summary")?,
            category: required_text(object, "category")?,
            root_cause: required_text(object, "root_cause")?,
            issue_type: required_enum(object, "issue_type", IssueType::parse, &IssueType::ALL)?,
            severity: required_enum(object, "severity", Severity::parse, &Severity::ALL)?,
            confidence: required_confidence(object)?,
            engineering_actions: required_text_list(object, "engineering_actions")?,
            product_actions: required_text_list(object, "product_actions")?,
            support_reply_suggestion: required_text(object, "support_reply_suggestion")?,
            similar_incidents: Vec::new(),
        })
    }

    /// Replace `similar_incidents` with identifiers from retrieval
    #[must_use]
    pub fn with_similar_incidents(mut self, identifiers: Vec<String>) -> Self {
        self.similar_incidents = identifiers;
        self
    }
}

fn field<'a>(object: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value> {
    match object.get(name) {
        None | Some(Value::Null) => Err(RcaError::validation(name, "is required")),
        Some(value) => Ok(value),
    }
}

fn required_text(object: &Map<String, Value>, name: &'static str) -> Result<String> {
    let text = field(object, name)?
        .as_str()
        .ok_or_else(|| RcaError::validation(name, "must be a string"))?
        .trim();

    if text.is_empty() {
        return Err(RcaError::validation(name, "must not be empty"));
    }
    Ok(text.to_string())
}

fn required_enum<T: fmt::Display>(
    object: &Map<String, Value>,
    name: &'static str,
    parse: fn(&str) -> Option<T>,
    allowed: &[T],
) -> Result<T> {
    let raw = field(object, name)?
        .as_str()
        .ok_or_else(|| RcaError::validation(name, "must be a string"))?;

    parse(raw).ok_or_else(|| {
        let allowed = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        RcaError::validation(name, format!("must be one of {allowed}, got '{raw}'"))
    })
}

fn required_confidence(object: &Map<String, Value>) -> Result<f64> {
    let confidence = field(object, "confidence")?
        .as_f64()
        .ok_or_else(|| RcaError::validation("confidence", "must be a number"))?;

    if !(0.0..=1.0).contains(&confidence) {
        return Err(RcaError::validation(
            "confidence",
            format!("must be within [0.0, 1.0], got {confidence}"),
        ));
    }
    Ok(confidence)
}

fn required_text_list(object: &Map<String, Value>, name: &'static str) -> Result<Vec<String>> {
    let items = field(object, name)?
        .as_array()
        .ok_or_else(|| RcaError::validation(name, "must be a list of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(ToString::to_string)
                .ok_or_else(|| RcaError::validation(name, "must be a list of strings"))
        })
        .collect()
}

/// A past ticket stored in the similarity index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedIncident {
    pub identifier: String,
    pub content: String,
}

impl IndexedIncident {
    pub fn new(identifier: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            content: content.into(),
        }
    }
}

/// Seed corpus entry with its reference analysis
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTicket {
    pub ticket_id: String,
    pub ticket_content: String,
    pub analysis: RootCauseAnalysis,
}

impl From<&SeedTicket> for IndexedIncident {
    fn from(ticket: &SeedTicket) -> Self {
        Self::new(&ticket.ticket_id, &ticket.ticket_content)
    }
}
