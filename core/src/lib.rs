//! Game engine for Piggy Bank Adventures: a twelve-month money game for kids.
//!
//! All state changes flow through `engine::transition`; `session` owns the
//! one live GameState and serializes every change to it.

pub mod action;
pub mod catalog;
pub mod companion;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod market;
pub mod metrics;
pub mod rng;
pub mod scam;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
