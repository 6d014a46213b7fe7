//! Prompt construction from a read-only game snapshot.

use crate::{config::EconomyConfig, state::GameState};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role:    ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }

    fn speaker(&self) -> &'static str {
        match self.role {
            ChatRole::User => "Kid",
            ChatRole::Assistant => "Piggy",
        }
    }
}

const PERSONA: &str = "\
You are Piggy, a friendly piggy bank character teaching kids (ages 8-12) about money.

PERSONALITY:
- Warm, encouraging, and patient
- Use simple words a 10-year-old can understand
- Add occasional pig puns (\"That's un-BOAR-lievably smart!\", \"Sow exciting!\")
- Celebrate good financial decisions, gently guide them away from bad ones
- Never be judgmental about mistakes - treat them as learning opportunities

KNOWLEDGE AREAS:
- Saving money and why it matters
- The difference between needs and wants
- How interest makes money grow over time
- How subscriptions can add up quickly
- Recognizing and avoiding scams
- Basic investing concepts (can go up OR down!)

RESPONSE STYLE:
- Keep responses SHORT (2-4 sentences maximum)
- Use 1-2 emojis per message (not more)
- Give concrete examples kids can relate to (toys, games, candy, etc.)
- End with encouragement or a simple follow-up question
- Never use complex financial jargon";

const RULES: &str = "\
IMPORTANT RULES:
- Always stay in character as Piggy the friendly pig
- Never mention being an AI or language model
- If asked about non-money topics, gently steer back to saving, spending or scams
- Reference the player's actual financial state when giving advice
- If they're doing well financially, celebrate! If they're struggling, be supportive and offer tips.";

/// A rate as a percentage to one decimal: 0.02 -> "2%", 0.025 -> "2.5%".
fn percent(rate: f64, signed: bool) -> String {
    let tenths = (rate * 1000.0).round() / 10.0;
    let number = if tenths.fract() == 0.0 {
        format!("{}", tenths as i64)
    } else {
        format!("{tenths}")
    };
    if signed && tenths > 0.0 {
        format!("+{number}%")
    } else {
        format!("{number}%")
    }
}

/// System prompt: persona plus the player's current numbers and the
/// economy they are playing under.
pub fn system_prompt(state: &GameState, economy: &EconomyConfig) -> String {
    let name = if state.player_name.trim().is_empty() {
        "Friend"
    } else {
        state.player_name.as_str()
    };
    let subscriptions = if state.subscriptions.is_empty() {
        "None".to_string()
    } else {
        state
            .subscriptions
            .iter()
            .map(|s| format!("{} (${}/mo)", s.name, s.monthly_cost))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut prompt = String::with_capacity(PERSONA.len() + RULES.len() + 512);
    prompt.push_str(PERSONA);
    prompt.push_str("\n\nCURRENT PLAYER'S FINANCIAL STATE:\n");
    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "- Player Name: {name}");
    let _ = writeln!(
        prompt,
        "- Current Month: {} of {}",
        state.current_month, economy.final_month
    );
    let _ = writeln!(prompt, "- Wallet (spending money): ${}", state.wallet);
    let _ = writeln!(
        prompt,
        "- Savings Account: ${} (earns {} interest monthly)",
        state.savings,
        percent(economy.savings_interest_rate, false)
    );
    let _ = writeln!(
        prompt,
        "- Investments: ${} (can change {} to {} monthly)",
        state.investments,
        percent(economy.investment_return_min, true),
        percent(economy.investment_return_max, true)
    );
    let _ = writeln!(prompt, "- Total Wealth: ${}", state.total_wealth());
    let _ = writeln!(prompt, "- Active Subscriptions: {subscriptions}");
    let _ = writeln!(prompt, "- Monthly Subscription Cost: ${}", state.monthly_subscription_cost());
    let _ = writeln!(prompt, "- Scams Avoided: {}", state.scams_avoided);
    let _ = writeln!(prompt, "- Scams Fell For: {}", state.scams_fell_for);
    prompt.push('\n');
    prompt.push_str(RULES);
    prompt
}

/// Full prompt: system prompt, the last `window` messages, then the new input.
pub fn build_prompt(
    state: &GameState,
    economy: &EconomyConfig,
    history: &[ChatMessage],
    window: usize,
    input: &str,
) -> String {
    let start = history.len().saturating_sub(window);
    let conversation = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.speaker(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nCONVERSATION SO FAR:\n{}\n\nKid: {}\n\nPiggy (respond in character, keep it short and kid-friendly):",
        system_prompt(state, economy),
        conversation,
        input
    )
}

/// Trim the reply and drop a leading "Piggy:" the model sometimes echoes.
pub fn clean_reply(raw: &str) -> String {
    let trimmed = raw.trim();
    let prefix = "piggy:";
    match trimmed.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => {
            trimmed[prefix.len()..].trim_start().to_string()
        }
        _ => trimmed.to_string(),
    }
}
