//! phrasetrader: plain-English trading rules compiled and backtested.
//!
//! Hexagonal architecture: the rule compiler and backtest engine live in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
