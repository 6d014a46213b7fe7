//! Tunable constants for the economy, the scam trigger and the companion.
//!
//! `GameConfig::default()` is the canonical rule set. A JSON file may
//! override any subset of fields; missing fields keep their defaults.

use crate::types::{Money, Month};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    /// Wallet balance, first wealth-history point and initial total_earned.
    pub starting_wallet: Money,
    pub monthly_allowance: Money,
    /// Simple monthly interest on the savings balance.
    pub savings_interest_rate: f64,
    /// Lower bound (inclusive) of the monthly investment return.
    pub investment_return_min: f64,
    /// Upper bound (exclusive) of the monthly investment return.
    pub investment_return_max: f64,
    /// Advancing past this month ends the game instead.
    pub final_month: Month,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_wallet:       100,
            monthly_allowance:     100,
            savings_interest_rate: 0.02,
            investment_return_min: -0.15,
            investment_return_max: 0.20,
            final_month:           12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScamConfig {
    /// Clicks needed before a scam is scheduled.
    pub click_threshold: u32,
    /// Delay between the threshold click and the scenario surfacing.
    pub trigger_delay_ms: u64,
    /// Wallet penalty requested when the player falls for a scam.
    pub penalty: Money,
}

impl Default for ScamConfig {
    fn default() -> Self {
        Self {
            click_threshold:  3,
            trigger_delay_ms: 100,
            penalty:          25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompanionConfig {
    /// Never read from or written to config files; see `with_env_keys`.
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
    #[serde(skip)]
    pub elevenlabs_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    /// Number of prior chat messages included in each prompt.
    pub history_window: usize,
    pub elevenlabs_base_url: String,
    pub voice_id: String,
    pub tts_model: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            gemini_api_key:      None,
            elevenlabs_api_key:  None,
            gemini_base_url:     "https://generativelanguage.googleapis.com/v1beta".into(),
            gemini_model:        "gemini-2.0-flash".into(),
            temperature:         0.8,
            max_output_tokens:   150,
            top_p:               0.9,
            history_window:      6,
            elevenlabs_base_url: "https://api.elevenlabs.io/v1".into(),
            voice_id:            "21m00Tcm4TlvDq8ikWAM".into(),
            tts_model:           "eleven_turbo_v2_5".into(),
        }
    }
}

impl CompanionConfig {
    /// Pick up API keys from `GEMINI_API_KEY` and `ELEVENLABS_API_KEY`.
    /// Empty variables count as unset.
    pub fn with_env_keys(mut self) -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        self.gemini_api_key = read("GEMINI_API_KEY");
        self.elevenlabs_api_key = read("ELEVENLABS_API_KEY");
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub economy:   EconomyConfig,
    pub scam:      ScamConfig,
    pub companion: CompanionConfig,
}

impl GameConfig {
    /// Load overrides from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: GameConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let econ = &self.economy;
        if econ.investment_return_min >= econ.investment_return_max {
            anyhow::bail!(
                "investment_return_min ({}) must be below investment_return_max ({})",
                econ.investment_return_min,
                econ.investment_return_max
            );
        }
        if econ.final_month == 0 {
            anyhow::bail!("final_month must be at least 1");
        }
        if self.scam.click_threshold == 0 {
            anyhow::bail!("click_threshold must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "economy": { "monthly_allowance": 50 } }"#)
            .expect("parse partial config");

        assert_eq!(config.economy.monthly_allowance, 50);
        assert_eq!(config.economy.starting_wallet, 100);
        assert_eq!(config.scam, ScamConfig::default());
    }

    #[test]
    fn inverted_return_range_is_rejected() {
        let err = GameConfig::from_json(
            r#"{ "economy": { "investment_return_min": 0.3, "investment_return_max": 0.1 } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("investment_return_min"));
    }

    #[test]
    fn api_keys_never_serialize() {
        let mut config = GameConfig::default();
        config.companion.gemini_api_key = Some("secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
