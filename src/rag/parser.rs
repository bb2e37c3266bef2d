//! Strict parsing of model output into the analysis schema

use serde_json::Value;

use crate::errors::RcaError;
use crate::errors::Result;
use crate::models::RootCauseAnalysis;

/// Parse and validate a raw model completion
pub fn parse_analysis(raw: &str) -> Result<RootCauseAnalysis> {
    let value = extract_json_object(raw)?;
    RootCauseAnalysis::from_value(&value)
}

/// Locate the JSON object in a completion
///
/// Accepts a bare object, one wrapped in a Markdown code fence, or one
/// surrounded by prose. Anything else is a parse failure carrying `raw`.
pub fn extract_json_object(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RcaError::parse("model returned no content", raw));
    }

    let text = match strip_code_fence(trimmed) {
        "" => trimmed,
        body => body,
    };

    let first_error = match serde_json::from_str::<Value>(text) {
        Ok(value) if value.is_object() => return Ok(value),
        Ok(_) => return Err(RcaError::parse("expected a JSON object", raw)),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }

    Err(RcaError::parse(format!("invalid JSON: {first_error}"), raw))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);

    // Drop the info string (e.g. "json"), which ends at a newline, a space
    // or the opening brace when the fence sits on one line
    let body_start = rest
        .find(|c: char| c.is_whitespace() || c == '{' || c == '[')
        .unwrap_or(rest.len());
    rest[body_start..].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueType;
    use crate::tests::valid_model_reply;

    #[test]
    fn test_bare_object() {
        let analysis = parse_analysis(&valid_model_reply()).unwrap();
        assert_eq!(analysis.issue_type, IssueType::UserError);
        assert!(analysis.similar_incidents.is_empty());
    }

    #[test]
    fn test_fenced_object() {
        let raw = format!("```json\n{}\n```", valid_model_reply());
        assert!(parse_analysis(&raw).is_ok());

        let raw = format!("```\n{}\n```\n", valid_model_reply());
        assert!(parse_analysis(&raw).is_ok());
    }

    #[test]
    fn test_single_line_fence() {
        let raw = format!("```json {}```", valid_model_reply());
        assert!(parse_analysis(&raw).is_ok());

        let compact = valid_model_reply().replace('\n', " ");
        assert!(parse_analysis(&format!("```json{compact}```")).is_ok());
        assert!(parse_analysis(&format!("```{compact}```")).is_ok());
    }

    #[test]
    fn test_empty_fence_is_invalid_json() {
        let err = extract_json_object("```json\n```").unwrap_err();
        assert!(matches!(err, RcaError::ParseFailure { .. }));
        assert!(err.to_string().contains("invalid JSON"));
        assert_eq!(err.raw_output(), Some("```json\n```"));
    }

    #[test]
    fn test_object_inside_prose() {
        let raw = format!(
            "Here is the analysis you asked for:\n{}\nLet me know if you need more.",
            valid_model_reply()
        );
        assert!(parse_analysis(&raw).is_ok());
    }

    #[test]
    fn test_prose_only_is_parse_failure_with_raw_text() {
        let raw = "I'm sorry, I can't analyze this ticket.";
        let err = parse_analysis(raw).unwrap_err();
        assert!(matches!(err, RcaError::ParseFailure { .. }));
        assert_eq!(err.raw_output(), Some(raw));
    }

    #[test]
    fn test_empty_output() {
        assert!(matches!(
            parse_analysis("   "),
            Err(RcaError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_array_is_not_an_object() {
        let err = extract_json_object("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_truncated_json() {
        let raw = r#"{"summary": "cut off", "category": "#;
        assert!(matches!(
            parse_analysis(raw),
            Err(RcaError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_well_formed_but_invalid_is_validation_failure() {
        let raw = r#"{"summary": "ok", "category": "Login"}"#;
        assert!(matches!(
            parse_analysis(raw),
            Err(RcaError::ValidationFailure {
                field: "root_cause",
                ..
            })
        ));
    }
}
