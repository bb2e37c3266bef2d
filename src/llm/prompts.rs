//! Prompt templates with `{{variable}}` placeholders

use std::collections::HashMap;

use crate::errors::RcaError;
use crate::errors::Result;

/// A piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

/// Template for generating prompts
///
/// Rendering is a single pass over the parsed template, so placeholder-like
/// text inside substituted values is left untouched.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl AsRef<str>) -> Self {
        let segments = parse_segments(template.as_ref());
        let mut variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            }
        }
        Self {
            segments,
            variables,
        }
    }

    /// Fill in the template; every variable must have a value
    pub fn render(&self, values: &HashMap<&str, &str>) -> Result<String> {
        let mut result = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => result.push_str(text),
                Segment::Variable(name) => {
                    let value = values.get(name.as_str()).ok_or_else(|| {
                        RcaError::ConfigError(format!("Missing prompt variable '{name}'"))
                    })?;
                    result.push_str(value);
                }
            }
        }
        Ok(result)
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Split a template into literal text and variable references
fn parse_segments(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            break;
        };

        let name = after_open[..end].trim();
        if name.is_empty() {
            // Not a placeholder; keep the braces as text
            push_text(&mut segments, &rest[..start + 4 + end]);
        } else {
            push_text(&mut segments, &rest[..start]);
            segments.push(Segment::Variable(name.to_string()));
        }
        rest = &after_open[end + 2..];
    }
    push_text(&mut segments, rest);

    segments
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}
