//! Ticket submission client

use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::cli::output::print_analysis_summary;
use crate::models::RootCauseAnalysis;
use crate::Result;

pub const NO_TICKET_MESSAGE: &str = "No ticket content provided.";

/// Result of posting a ticket to the service
#[derive(Debug)]
pub enum SubmitOutcome {
    /// 2xx with a JSON body
    Analysis(Value),
    /// Non-2xx reply
    Rejected { status: u16, body: String },
    /// Could not reach the service or read its reply
    Transport { url: String, error: String },
}

impl SubmitOutcome {
    /// Text printed for this outcome
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Analysis(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Rejected { status, body } => format!("Error: {status} - {body}"),
            Self::Transport { url, error } => {
                format!("An error occurred while requesting {url}: {error}")
            }
        }
    }
}

/// POST the raw ticket text to `{base_url}/analyze_ticket`
pub async fn submit_ticket(client: &reqwest::Client, base_url: &str, ticket: &str) -> SubmitOutcome {
    let url = format!("{}/analyze_ticket", base_url.trim_end_matches('/'));

    let response = match client.post(&url).body(ticket.to_string()).send().await {
        Ok(response) => response,
        Err(e) => {
            return SubmitOutcome::Transport {
                url,
                error: e.to_string(),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return SubmitOutcome::Rejected {
            status: status.as_u16(),
            body,
        };
    }

    match response.json::<Value>().await {
        Ok(value) => SubmitOutcome::Analysis(value),
        Err(e) => SubmitOutcome::Transport {
            url,
            error: e.to_string(),
        },
    }
}

/// Join stdin lines the way an interactive session entered them
#[must_use]
pub fn collect_ticket(input: &str) -> String {
    input.lines().collect::<Vec<_>>().join("\n")
}

pub async fn handle_analyze(url: &str) -> Result<()> {
    println!(
        "Enter your support ticket (press Ctrl+D or Ctrl+Z and then Enter to finish input):"
    );

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let ticket = collect_ticket(&input);

    if ticket.trim().is_empty() {
        println!("{NO_TICKET_MESSAGE}");
        return Ok(());
    }

    let client = reqwest::Client::new();
    let outcome = submit_ticket(&client, url, &ticket).await;
    println!("{}", outcome.render());

    if let SubmitOutcome::Analysis(value) = &outcome {
        if let Ok(analysis) = serde_json::from_value::<RootCauseAnalysis>(value.clone()) {
            print_analysis_summary(&analysis);
        }
    }

    Ok(())
}
