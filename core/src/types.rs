//! Shared primitive types used across the entire game.

/// Play money. Signed because a wallet may dip below zero when
/// subscription billing outruns the allowance.
pub type Money = i64;

/// A game month, counted from 1 up to the configured final month. One month = one AdvanceMonth transition.
pub type Month = u32;

/// A stable, unique identifier for a ledger entry.
pub type TxnId = String;

/// The canonical session identifier.
pub type SessionId = String;
