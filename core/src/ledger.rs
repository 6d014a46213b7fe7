//! Ledger entry model: transactions, subscriptions and id generation.
//!
//! RULE: A Transaction is never altered after creation. The ledger only
//! grows, newest entry first.

use crate::types::{Money, Month, TxnId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Subscription,
    Transfer,
    Interest,
    Investment,
    Allowance,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase     => "purchase",
            Self::Subscription => "subscription",
            Self::Transfer     => "transfer",
            Self::Interest     => "interest",
            Self::Investment   => "investment",
            Self::Allowance    => "allowance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id:          TxnId,
    pub kind:        TransactionKind,
    pub description: String,
    /// Negative = money leaving the player's accounts.
    pub amount:      Money,
    /// Game month the entry belongs to.
    pub month:       Month,
    pub icon:        String,
}

impl Transaction {
    pub fn new(
        id: TxnId,
        kind: TransactionKind,
        description: impl Into<String>,
        amount: Money,
        month: Month,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            description: description.into(),
            amount,
            month,
            icon: icon.into(),
        }
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < 0
    }
}

/// A recurring monthly charge. At most one per id is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub id:           String,
    pub name:         String,
    pub monthly_cost: Money,
    pub icon:         String,
}

impl Subscription {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        monthly_cost: Money,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            monthly_cost,
            icon: icon.into(),
        }
    }
}

/// Source of transaction ids. Injected into the engine so tests can
/// assert exact ids and ordering.
pub trait IdSource: Send {
    fn next_id(&mut self) -> TxnId;

    /// Rewind after a game reset. Sources without state ignore this.
    fn reset(&mut self) {}
}

/// Monotonic `txn-1`, `txn-2`, ... ids.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    issued: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> TxnId {
        self.issued += 1;
        format!("txn-{}", self.issued)
    }

    fn reset(&mut self) {
        self.issued = 0;
    }
}

/// UUID v4 ids, for sessions whose ledgers get merged elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> TxnId {
        format!("txn-{}", Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_monotonic_and_rewind() {
        let mut ids = SequentialIds::new();
        assert_eq!(ids.next_id(), "txn-1");
        assert_eq!(ids.next_id(), "txn-2");
        assert_eq!(ids.issued(), 2);

        ids.reset();
        assert_eq!(ids.next_id(), "txn-1");
    }

    #[test]
    fn random_ids_do_not_collide() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(a.starts_with("txn-"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionKind::Allowance).unwrap();
        assert_eq!(json, "\"allowance\"");
        assert_eq!(TransactionKind::Purchase.as_str(), "purchase");
    }
}
