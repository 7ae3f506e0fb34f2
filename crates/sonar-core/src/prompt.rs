//! Prompt construction for the language model
//!
//! The detected intent and whatever enrichment data was fetched are rendered
//! into the system prompt as plain text.

use crate::format::truncate_address;
use crate::models::{DetectedIntent, IntentType};

pub const ASSISTANT_PERSONA: &str = "You are Sonar, a crypto research assistant inside an analytics dashboard. \
Answer in a few short paragraphs. Use the data provided below when it is relevant and say so when data is missing. \
Never give financial advice or tell the user to buy or sell.";

/// Fetched data blocks are cut to this many characters each.
pub const MAX_SECTION_CHARS: usize = 4000;

/// One enrichment block. `body` is `None` when the fetch failed.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSection {
    pub title: String,
    pub body: Option<String>,
}

/// Natural-language description of an intent.
pub fn intent_context(intent: &DetectedIntent) -> String {
    let mut lines = vec![format!(
        "Detected intent: {} (confidence {:.0}%).",
        intent.intent_type,
        intent.confidence * 100.0
    )];

    if !intent.tokens.is_empty() {
        let tokens: Vec<String> = intent
            .tokens
            .iter()
            .map(|t| if t.len() > 12 { truncate_address(t) } else { t.clone() })
            .collect();
        lines.push(format!("Tokens mentioned: {}.", tokens.join(", ")));
    }
    if !intent.wallets.is_empty() {
        let wallets: Vec<String> = intent.wallets.iter().map(|w| truncate_address(w)).collect();
        lines.push(format!("Wallets mentioned: {}.", wallets.join(", ")));
    }
    if !intent.dapps.is_empty() {
        lines.push(format!("DApps mentioned: {}.", intent.dapps.join(", ")));
    }
    if let Some(pair) = &intent.comparison {
        lines.push(format!("The user wants to compare {} with {}.", pair.from, pair.to));
    }
    if let Some(alert) = intent.alert_type {
        lines.push(format!("The user is asking about a {} alert.", alert));
    }

    lines.push(guidance(intent.intent_type).to_string());
    lines.join("\n")
}

fn guidance(intent_type: IntentType) -> &'static str {
    match intent_type {
        IntentType::Token => "Focus on price, liquidity and recent performance of the mentioned tokens.",
        IntentType::Wallet => "Summarize the wallet's holdings, trading behavior and notable activity.",
        IntentType::Market => "Give a concise overview of current market conditions.",
        IntentType::Comparison => "Compare both assets side by side and highlight the key differences.",
        IntentType::Alert => "Explain what such an alert would watch for. Alerts are not created automatically.",
        IntentType::Dapp => "Describe the protocol, its TVL and what users do with it.",
        IntentType::General => "Answer the question directly.",
    }
}

pub fn system_prompt(intent: &DetectedIntent, sections: &[DataSection]) -> String {
    let mut prompt = String::from(ASSISTANT_PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(&intent_context(intent));

    for section in sections {
        prompt.push_str("\n\n### ");
        prompt.push_str(&section.title);
        prompt.push('\n');
        match &section.body {
            Some(body) => prompt.push_str(&clip(body, MAX_SECTION_CHARS)),
            None => prompt.push_str("(unavailable: the data source did not respond)"),
        }
    }

    prompt
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::detect_intent;

    #[test]
    fn test_intent_context_for_token() {
        let context = intent_context(&detect_intent("What's the price of SOL?"));
        assert!(context.starts_with("Detected intent: token"));
        assert!(context.contains("Tokens mentioned: SOL."));
        assert!(context.contains("Focus on price"));
    }

    #[test]
    fn test_intent_context_truncates_addresses() {
        let context = intent_context(&detect_intent(
            "profile wallet 7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
        ));
        assert!(context.contains("Wallets mentioned: 7xKX...gAsU."));
    }

    #[test]
    fn test_intent_context_for_comparison() {
        let context = intent_context(&detect_intent("SOL vs ETH"));
        assert!(context.contains("compare SOL with ETH"));
    }

    #[test]
    fn test_system_prompt_sections() {
        let intent = detect_intent("compare SOL and ETH");
        let prompt = system_prompt(
            &intent,
            &[
                DataSection { title: "Token: SOL".into(), body: Some("{\"price\":150}".into()) },
                DataSection { title: "Token: ETH".into(), body: None },
            ],
        );
        assert!(prompt.starts_with(ASSISTANT_PERSONA));
        assert!(prompt.contains("### Token: SOL\n{\"price\":150}"));
        assert!(prompt.contains("### Token: ETH\n(unavailable"));
    }

    #[test]
    fn test_long_sections_are_clipped() {
        let body = "x".repeat(MAX_SECTION_CHARS + 100);
        let clipped = clip(&body, MAX_SECTION_CHARS);
        assert_eq!(clipped.chars().count(), MAX_SECTION_CHARS + 1);
        assert_eq!(clip("short", MAX_SECTION_CHARS), "short");
    }
}
