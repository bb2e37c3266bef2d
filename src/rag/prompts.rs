//! Instruction prompt for ticket analysis

use std::collections::HashMap;

use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::PromptTemplate;
use crate::models::ANALYSIS_FIELDS;

/// Marker injected when retrieval found nothing
pub const NO_SIMILAR_INCIDENTS: &str = "None";

pub const SYSTEM_PROMPT: &str = "You are an AI customer support root cause analyzer. \
Your goal is to convert messy customer support tickets into clear root causes, \
actionable fixes, and product insights. Always output in the specified JSON format.";

const ANALYSIS_TEMPLATE: &str = r"Analyze the following support ticket and respond with a single JSON object containing exactly these keys:

{{fields}}

Use the key names exactly as written above (snake_case). If similar incidents are provided, use them for pattern detection. Do not add commentary outside the JSON object.

Support Ticket:
{{ticket}}

Similar Incidents:
{{similar_incidents}}

Output JSON:";

/// Rendered instruction for one ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

impl PromptPayload {
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Builds the analysis prompt; output depends only on its inputs
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: PromptTemplate,
    field_list: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn new() -> Self {
        let field_list = ANALYSIS_FIELDS
            .iter()
            .map(|field| format!("- {}: {}", field.name, field.description))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            template: PromptTemplate::new(ANALYSIS_TEMPLATE),
            field_list,
        }
    }

    pub fn build(&self, ticket: &str, similar_incidents: &str) -> Result<PromptPayload> {
        let similar_incidents = if similar_incidents.trim().is_empty() {
            NO_SIMILAR_INCIDENTS
        } else {
            similar_incidents
        };

        let values = HashMap::from([
            ("fields", self.field_list.as_str()),
            ("ticket", ticket),
            ("similar_incidents", similar_incidents),
        ]);

        Ok(PromptPayload {
            system: SYSTEM_PROMPT.to_string(),
            user: self.template.render(&values)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        let a = builder.build("Payments failing", "INC text").unwrap();
        let b = builder.build("Payments failing", "INC text").unwrap();
        assert_eq!(a, b);

        let fresh = PromptBuilder::new()
            .build("Payments failing", "INC text")
            .unwrap();
        assert_eq!(a.user.as_bytes(), fresh.user.as_bytes());
    }

    #[test]
    fn test_every_field_is_described() {
        let payload = PromptBuilder::new().build("ticket", "").unwrap();
        for field in &ANALYSIS_FIELDS {
            assert!(
                payload.user.contains(&format!("- {}: {}", field.name, field.description)),
                "missing field {}",
                field.name
            );
        }
        assert!(payload.user.contains("snake_case"));
    }

    #[test]
    fn test_similar_incidents_embedded_verbatim() {
        let similar = "Subject: Payments failing again!!!\nThe checkout page just spins";
        let payload = PromptBuilder::new().build("my ticket", similar).unwrap();
        assert!(payload.user.contains(similar));
        assert!(payload.user.contains("Support Ticket:\nmy ticket\n"));
    }

    #[test]
    fn test_none_marker_when_nothing_retrieved() {
        let payload = PromptBuilder::new().build("my ticket", "  \n").unwrap();
        assert!(payload
            .user
            .contains(&format!("Similar Incidents:\n{NO_SIMILAR_INCIDENTS}\n")));
    }

    #[test]
    fn test_ticket_with_placeholder_text_is_not_expanded() {
        let payload = PromptBuilder::new()
            .build("literal {{similar_incidents}} in ticket", "real context")
            .unwrap();
        assert!(payload.user.contains("literal {{similar_incidents}} in ticket"));
    }

    #[test]
    fn test_messages_roles() {
        let messages = PromptBuilder::new().build("t", "s").unwrap().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
    }
}
