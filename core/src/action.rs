use crate::{ledger::Subscription, state::Tab, types::Money};
use serde::{Deserialize, Serialize};

/// Every action the engine accepts.
/// Variants may be appended, never removed or reordered: journals
/// replay by tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameAction {
    // ── Setup ─────────────────────────────────────
    SetPlayerName { name: String },
    StartGame,
    SetTab { tab: Tab },

    // ── Spending ──────────────────────────────────
    BuyItem { name: String, cost: Money, icon: String },
    AddSubscription { subscription: Subscription },
    RemoveSubscription { id: String },

    // ── Moving money ──────────────────────────────
    TransferToSavings { amount: Money },
    TransferToWallet { amount: Money },
    TransferToInvestments { amount: Money },

    // ── Clock ─────────────────────────────────────
    AdvanceMonth,

    // ── Scam outcomes ─────────────────────────────
    ScamAvoided,
    ScamFellFor { penalty: Money },

    ResetGame,

    /// Any tag this build does not recognise. Always a no-op.
    #[serde(other)]
    Unknown,
}

impl GameAction {
    /// Stable tag, matching the serialized `action` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetPlayerName { .. }         => "set_player_name",
            Self::StartGame                    => "start_game",
            Self::SetTab { .. }                => "set_tab",
            Self::BuyItem { .. }               => "buy_item",
            Self::AddSubscription { .. }       => "add_subscription",
            Self::RemoveSubscription { .. }    => "remove_subscription",
            Self::TransferToSavings { .. }     => "transfer_to_savings",
            Self::TransferToWallet { .. }      => "transfer_to_wallet",
            Self::TransferToInvestments { .. } => "transfer_to_investments",
            Self::AdvanceMonth                 => "advance_month",
            Self::ScamAvoided                  => "scam_avoided",
            Self::ScamFellFor { .. }           => "scam_fell_for",
            Self::ResetGame                    => "reset_game",
            Self::Unknown                      => "unknown",
        }
    }

    pub fn buy(name: impl Into<String>, cost: Money, icon: impl Into<String>) -> Self {
        Self::BuyItem { name: name.into(), cost, icon: icon.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_through_name() {
        let action = GameAction::TransferToSavings { amount: 40 };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action"], action.name());
        assert_eq!(json["amount"], 40);
    }

    #[test]
    fn unrecognised_tag_becomes_unknown() {
        let action: GameAction = serde_json::from_str(r#"{"action":"teleport"}"#).unwrap();
        assert_eq!(action, GameAction::Unknown);
    }
}
