//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `rootcause` CLI

use crate::models::RootCauseAnalysis;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print the effective configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    println!("📋 Root Cause Analyzer Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Address: {}", config.bind_address());
    println!("  CORS: {}", config.server.enable_cors);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {}", config.llm.provider);
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  API key: {}", mask_api_key(config.llm.api_key.as_deref()));
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Timeout: {}s", config.llm.timeout_secs);
    println!("  Max retries: {}", config.llm.max_retries);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embedding_endpoint());
    println!("  Model: {}", config.embedding_model());
    println!(
        "  API key: {}",
        mask_api_key(config.embeddings.api_key.as_deref())
    );
    println!();

    println!("🔍 Retrieval:");
    println!("  Top k: {}", config.top_k());
    match config.index_path() {
        Some(path) => println!("  Snapshot: {}", path.display()),
        None => println!("  Snapshot: disabled (in-memory)"),
    }
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Directory: {}", config.logging.log_dir);
    println!("  File output: {}", config.logging.file_output);
}

/// Show only the first and last characters of a secret
#[must_use]
pub fn mask_api_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.is_empty() => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "***masked***".to_string(),
        Some(key) => {
            let head: String = key.chars().take(3).collect();
            let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("{head}...{tail}")
        }
    }
}

/// Print a short human summary below the JSON result
pub fn print_analysis_summary(analysis: &RootCauseAnalysis) {
    println!();
    println!(
        "🔎 {} | {} | {} severity | confidence {:.2}",
        analysis.category, analysis.issue_type, analysis.severity, analysis.confidence
    );
    println!("   Root cause: {}", truncate_str(&analysis.root_cause, 120));
    if !analysis.similar_incidents.is_empty() {
        println!(
            "   Similar incidents: {}",
            analysis.similar_incidents.join(", ")
        );
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_str("short", 10), "short");
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key(None), "(not set)");
        assert_eq!(mask_api_key(Some("")), "(not set)");
        assert_eq!(mask_api_key(Some("abc123")), "***masked***");
        assert_eq!(mask_api_key(Some("sk-1234567890abcd")), "sk-...abcd");
    }
}
