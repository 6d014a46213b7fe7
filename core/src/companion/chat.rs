//! Text chat with Piggy over the Gemini `generateContent` endpoint.

use super::{
    prompt::{build_prompt, clean_reply, ChatMessage},
    CompanionError,
};
use crate::{
    config::{CompanionConfig, EconomyConfig},
    state::GameState,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;

const SERVICE: &str = "gemini";

pub const MISSING_KEY_REPLY: &str =
    "Oink! I'm having trouble connecting right now. Make sure the GEMINI_API_KEY is set up! 🐷";
pub const STATUS_REPLY: &str = "Oink! Something went wrong. Let's try again in a moment! 🐷";
pub const MALFORMED_REPLY: &str = "Oink! I got confused there. Can you ask me again? 🐷";
pub const TRANSPORT_REPLY: &str =
    "Oink! I'm having trouble thinking right now. Can you try asking again? 🐷";

/// Anything that turns a prompt into reply text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str)
        -> impl Future<Output = Result<String, CompanionError>> + Send;
}

pub struct GeminiClient {
    http:   reqwest::Client,
    config: CompanionConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: CompanionConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let safety: Vec<_> = [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| json!({ "category": category, "threshold": "BLOCK_ONLY_HIGH" }))
        .collect();

        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature":     self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
                "topP":            self.config.top_p,
            },
            "safetySettings": safety,
        })
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, CompanionError> {
        let key = self
            .config
            .gemini_api_key
            .as_deref()
            .ok_or(CompanionError::MissingApiKey { service: SERVICE })?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.gemini_base_url.trim_end_matches('/'),
            self.config.gemini_model
        );

        let response = self
            .http
            .post(url)
            .query(&[("key", key)])
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CompanionError::Status { service: SERVICE, status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|_| CompanionError::MalformedResponse { service: SERVICE })?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(CompanionError::MalformedResponse { service: SERVICE })
    }
}

/// Fixed reply shown in place of a failed generation.
pub fn fallback_reply(err: &CompanionError) -> &'static str {
    match err {
        CompanionError::MissingApiKey { .. } => MISSING_KEY_REPLY,
        CompanionError::Status { .. } => STATUS_REPLY,
        CompanionError::MalformedResponse { .. } => MALFORMED_REPLY,
        _ => TRANSPORT_REPLY,
    }
}

/// The chat side of Piggy: a generator plus the running conversation.
pub struct Companion<G> {
    generator: G,
    history:   Vec<ChatMessage>,
    window:    usize,
    economy:   EconomyConfig,
}

impl<G: TextGenerator> Companion<G> {
    pub fn new(generator: G, window: usize) -> Self {
        Self { generator, history: Vec::new(), window, economy: EconomyConfig::default() }
    }

    /// Describe the game's economy to the model with these rates.
    pub fn with_economy(mut self, economy: EconomyConfig) -> Self {
        self.economy = economy;
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Ask Piggy something. Blank input is ignored and returns None.
    ///
    /// History is only touched once the generator resolves, so dropping
    /// this future mid-request leaves the conversation as it was.
    pub async fn reply(&mut self, input: &str, state: &GameState) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let prompt = build_prompt(state, &self.economy, &self.history, self.window, input);
        let reply = match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let cleaned = clean_reply(&raw);
                if cleaned.is_empty() {
                    log::warn!("companion returned an empty reply");
                    MALFORMED_REPLY.to_string()
                } else {
                    cleaned
                }
            }
            Err(err) => {
                log::warn!("companion fallback: {err}");
                fallback_reply(&err).to_string()
            }
        };

        self.history.push(ChatMessage::user(input));
        self.history.push(ChatMessage::assistant(reply.clone()));
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::ChatRole;
    use std::{collections::VecDeque, sync::Mutex};

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, CompanionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, CompanionError>>) -> Self {
            Self { replies: Mutex::new(replies.into()), prompts: Mutex::new(Vec::new()) }
        }
    }

    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, CompanionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompanionError::MalformedResponse { service: "stub" }))
        }
    }

    #[tokio::test]
    async fn reply_strips_prefix_and_records_both_turns() {
        let mut piggy = Companion::new(Scripted::new(vec![Ok("Piggy: Save a little! 🐷".into())]), 6);
        let reply = piggy.reply("  should I save?  ", &GameState::default()).await;

        assert_eq!(reply.as_deref(), Some("Save a little! 🐷"));
        let roles: Vec<ChatRole> = piggy.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(piggy.history()[0].content, "should I save?");
    }

    #[tokio::test]
    async fn prompt_uses_the_configured_economy() {
        let economy = EconomyConfig { final_month: 8, savings_interest_rate: 0.04, ..EconomyConfig::default() };
        let mut piggy = Companion::new(Scripted::new(vec![Ok("Nice!".into())]), 6).with_economy(economy);
        piggy.reply("how long is left?", &GameState::default()).await;

        let prompts = piggy.generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("of 8"));
        assert!(prompts[0].contains("earns 4% interest monthly"));
    }

    #[tokio::test]
    async fn blank_input_never_reaches_the_generator() {
        let mut piggy = Companion::new(Scripted::new(vec![]), 6);
        assert_eq!(piggy.reply("   ", &GameState::default()).await, None);
        assert!(piggy.history().is_empty());
        assert!(piggy.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_map_to_fixed_fallbacks() {
        let mut piggy = Companion::new(
            Scripted::new(vec![
                Err(CompanionError::MissingApiKey { service: "gemini" }),
                Err(CompanionError::Status { service: "gemini", status: 500, body: String::new() }),
                Err(CompanionError::MalformedResponse { service: "gemini" }),
                Ok("   ".into()),
            ]),
            6,
        );
        let state = GameState::default();

        assert_eq!(piggy.reply("a", &state).await.as_deref(), Some(MISSING_KEY_REPLY));
        assert_eq!(piggy.reply("b", &state).await.as_deref(), Some(STATUS_REPLY));
        assert_eq!(piggy.reply("c", &state).await.as_deref(), Some(MALFORMED_REPLY));
        assert_eq!(piggy.reply("d", &state).await.as_deref(), Some(MALFORMED_REPLY));
        assert_eq!(piggy.history().len(), 8, "fallbacks are still part of the conversation");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(CompanionConfig::default());
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, CompanionError::MissingApiKey { service: "gemini" }));
    }

    #[test]
    fn request_body_carries_generation_settings() {
        let body = GeminiClient::new(CompanionConfig::default()).request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 150);
        assert_eq!(body["safetySettings"].as_array().map(Vec::len), Some(4));
    }
}
