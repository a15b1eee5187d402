//! swingtrader — decision-support engine for swing trading.
//!
//! Scores instruments, computes protective stop levels, classifies the
//! prevailing market regime, and sizes candidate positions under strict
//! risk limits. Hexagonal architecture: pure domain logic in [`domain`],
//! port traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
