//! Rule AST data structures.
//!
//! This module defines the canonical tree a strategy compiles to:
//! - `Operand`: What can be compared (price fields, constants, indicators)
//! - `IndicatorCall`: A registered indicator bound to a field and period
//! - `Rule`: Comparisons at the leaves, AND/OR logic above them
//!
//! The layering is carried by the types: a comparison only holds operands and
//! a logic node only holds rules, so no wrapper or mixed node can exist.

use crate::domain::indicator::IndicatorKind;
use std::fmt;

pub use crate::domain::ohlcv::PriceField;

/// Most comparisons a single entry or exit rule may hold. Evaluation recurses
/// once per tree level, and a binary tree is never deeper than its leaf count.
pub const MAX_COMPARISONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,
}

impl CompareOp {
    /// Maps both symbolic (`>=`) and word (`GTE`) spellings to one operator.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            ">" | "GT" => Some(CompareOp::Gt),
            "<" | "LT" => Some(CompareOp::Lt),
            ">=" | "GTE" => Some(CompareOp::Gte),
            "<=" | "LTE" => Some(CompareOp::Lte),
            "==" | "EQ" => Some(CompareOp::Eq),
            "!=" | "NEQ" => Some(CompareOp::Neq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "AND" => Some(LogicOp::And),
            "OR" => Some(LogicOp::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorCall {
    pub kind: IndicatorKind,
    pub field: PriceField,
    pub period: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(f64),
    Series(PriceField),
    Indicator(IndicatorCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Comparison {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    BinaryLogic {
        op: LogicOp,
        left: Box<Rule>,
        right: Box<Rule>,
    },
}

impl Rule {
    /// The always-false `0 > 1` used when a strategy has no exit clause.
    pub fn never() -> Self {
        Rule::Comparison {
            op: CompareOp::Gt,
            left: Operand::Value(0.0),
            right: Operand::Value(1.0),
        }
    }

    pub fn and(left: Rule, right: Rule) -> Self {
        Rule::BinaryLogic {
            op: LogicOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Rule, right: Rule) -> Self {
        Rule::BinaryLogic {
            op: LogicOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of comparison leaves in the tree. Walks with an explicit stack
    /// so arbitrarily deep trees can be measured.
    pub fn comparison_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(rule) = pending.pop() {
            match rule {
                Rule::Comparison { .. } => count += 1,
                Rule::BinaryLogic { left, right, .. } => {
                    pending.push(left);
                    pending.push(right);
                }
            }
        }
        count
    }
}

/// Collect every distinct indicator call referenced by a rule, in first-seen order.
pub fn extract_indicators(rule: &Rule) -> Vec<IndicatorCall> {
    let mut out = Vec::new();
    collect_indicators(rule, &mut out);
    out
}

fn collect_indicators(rule: &Rule, out: &mut Vec<IndicatorCall>) {
    match rule {
        Rule::Comparison { left, right, .. } => {
            for operand in [left, right] {
                if let Operand::Indicator(call) = operand {
                    if !out.contains(call) {
                        out.push(*call);
                    }
                }
            }
        }
        Rule::BinaryLogic { left, right, .. } => {
            collect_indicators(left, out);
            collect_indicators(right, out);
        }
    }
}

impl fmt::Display for IndicatorCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind.name(), self.field, self.period)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{}", v),
            Operand::Series(field) => write!(f, "{}", field),
            Operand::Indicator(call) => write!(f, "{}", call),
        }
    }
}

/// Renders DSL text that parses back to the same tree. Logic is
/// left-associative, so only a logic node on the right needs parentheses.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Comparison { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Rule::BinaryLogic { op, left, right } => {
                write!(f, "{} {} ", left, op.as_str())?;
                match right.as_ref() {
                    Rule::BinaryLogic { .. } => write!(f, "({})", right),
                    Rule::Comparison { .. } => write!(f, "{}", right),
                }
            }
        }
    }
}
