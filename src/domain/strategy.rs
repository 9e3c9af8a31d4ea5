//! A compiled strategy: one entry rule and one exit rule.

use crate::domain::rule::{extract_indicators, IndicatorCall, Rule};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub entry: Rule,
    pub exit: Rule,
}

impl Strategy {
    /// A strategy that enters on `entry` and never exits.
    pub fn entry_only(entry: Rule) -> Self {
        Self {
            entry,
            exit: Rule::never(),
        }
    }

    /// Distinct indicator calls used by either rule, entry rule first.
    pub fn indicators(&self) -> Vec<IndicatorCall> {
        let mut calls = extract_indicators(&self.entry);
        for call in extract_indicators(&self.exit) {
            if !calls.contains(&call) {
                calls.push(call);
            }
        }
        calls
    }
}

/// Canonical DSL text; parses back to an identical strategy.
impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ENTRY: {} EXIT: {}", self.entry, self.exit)
    }
}
