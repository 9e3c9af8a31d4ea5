//! Rule compiler and backtest core.
//!
//! Data flow: text → [`normalizer`] → DSL → [`dsl_parser`] → parse tree →
//! [`ast_builder`] → [`rule`] AST → [`rule_eval`] → signals → [`backtest`].

pub mod ohlcv;
pub mod position;
pub mod indicator;
pub mod normalizer;
pub mod dsl_lexer;
pub mod dsl_parser;
pub mod rule;
pub mod ast_builder;
pub mod rule_eval;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod pipeline;
pub mod catalog;
pub mod config_validation;
pub mod error;
