//! Parse tree to AST.
//!
//! - `condition` wrappers are collapsed: a group becomes its inner rule set,
//!   a comparison becomes a `Rule::Comparison`.
//! - A flat `rule_set` is folded left: `A AND B OR C` → `((A AND B) OR C)`.
//! - Leaf tokens are classified numeric-first, then as a field reference.
//! - Indicator names are checked against the registry here, so an
//!   unimplemented indicator fails at compile time.

use crate::domain::dsl_parser::{
    self, ComparisonNode, ConditionNode, ExpressionNode, RuleSetNode, StrategyNode,
};
use crate::domain::dsl_lexer::Token;
use crate::domain::error::PhraseTraderError;
use crate::domain::indicator::IndicatorKind;
use crate::domain::ohlcv::PriceField;
use crate::domain::rule::{CompareOp, IndicatorCall, LogicOp, Operand, Rule};
use crate::domain::strategy::Strategy;

pub fn build(tree: &StrategyNode) -> Result<Strategy, PhraseTraderError> {
    Ok(Strategy {
        entry: build_rule_set(&tree.entry)?,
        exit: build_rule_set(&tree.exit)?,
    })
}

/// Parse and build in one step.
pub fn compile_dsl(input: &str) -> Result<Strategy, PhraseTraderError> {
    let tree = dsl_parser::parse(input)?;
    build(&tree)
}

fn build_rule_set(node: &RuleSetNode) -> Result<Rule, PhraseTraderError> {
    let mut left = build_condition(&node.first)?;
    for (op_token, condition) in &node.rest {
        let op = LogicOp::from_token(&op_token.text).ok_or_else(|| malformed(format!(
            "'{}' is not a logic operator",
            op_token.text
        )))?;
        let right = build_condition(condition)?;
        left = Rule::BinaryLogic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn build_condition(node: &ConditionNode) -> Result<Rule, PhraseTraderError> {
    match node {
        ConditionNode::Comparison(comparison) => build_comparison(comparison),
        ConditionNode::Group(inner) => build_rule_set(inner),
    }
}

fn build_comparison(node: &ComparisonNode) -> Result<Rule, PhraseTraderError> {
    let op = CompareOp::from_token(&node.op.text).ok_or_else(|| {
        malformed(format!("'{}' is not a comparison operator", node.op.text))
    })?;
    Ok(Rule::Comparison {
        op,
        left: build_expression(&node.left)?,
        right: build_expression(&node.right)?,
    })
}

fn build_expression(node: &ExpressionNode) -> Result<Operand, PhraseTraderError> {
    match node {
        ExpressionNode::Leaf(token) => classify_leaf(&token.text),
        ExpressionNode::Indicator {
            name,
            field,
            period,
        } => build_indicator(name, field, period),
    }
}

/// Numeric parse first; anything else must name a price field.
pub fn classify_leaf(text: &str) -> Result<Operand, PhraseTraderError> {
    if let Ok(value) = text.parse::<f64>() {
        if value.is_finite() {
            return Ok(Operand::Value(value));
        }
    }
    PriceField::from_name(text)
        .map(Operand::Series)
        .ok_or_else(|| malformed(format!("'{}' is neither a number nor a price field", text)))
}

fn build_indicator(name: &Token, field: &Token, period: &Token) -> Result<Operand, PhraseTraderError> {
    let kind = IndicatorKind::from_name(&name.text).ok_or_else(|| {
        PhraseTraderError::UnknownIndicator {
            name: name.text.clone(),
        }
    })?;
    let field = PriceField::from_name(&field.text)
        .ok_or_else(|| malformed(format!("'{}' is not a price field", field.text)))?;
    let period = parse_period(&period.text)?;
    Ok(Operand::Indicator(IndicatorCall {
        kind,
        field,
        period,
    }))
}

fn parse_period(text: &str) -> Result<usize, PhraseTraderError> {
    let value: f64 = text
        .parse()
        .map_err(|_| malformed(format!("indicator period '{}' is not a number", text)))?;
    if value < 1.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(malformed(format!(
            "indicator period must be a positive integer, got {}",
            text
        )));
    }
    Ok(value as usize)
}

fn malformed(reason: String) -> PhraseTraderError {
    PhraseTraderError::MalformedAst { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_gt(v: f64) -> Rule {
        Rule::Comparison {
            op: CompareOp::Gt,
            left: Operand::Series(PriceField::Close),
            right: Operand::Value(v),
        }
    }

    fn sma(period: usize) -> Operand {
        Operand::Indicator(IndicatorCall {
            kind: IndicatorKind::Sma,
            field: PriceField::Close,
            period,
        })
    }

    #[test]
    fn single_comparison() {
        let s = compile_dsl("ENTRY: CLOSE > 10 EXIT: CLOSE < 5").unwrap();
        assert_eq!(s.entry, close_gt(10.0));
        assert_eq!(
            s.exit,
            Rule::Comparison {
                op: CompareOp::Lt,
                left: Operand::Series(PriceField::Close),
                right: Operand::Value(5.0),
            }
        );
    }

    #[test]
    fn word_and_symbol_operators_are_equivalent() {
        let words = compile_dsl("ENTRY: CLOSE GTE SMA(CLOSE, 3) EXIT: CLOSE NEQ 1").unwrap();
        let symbols = compile_dsl("ENTRY: CLOSE >= SMA(CLOSE, 3) EXIT: CLOSE != 1").unwrap();
        assert_eq!(words, symbols);
    }

    #[test]
    fn logic_is_left_associative() {
        let s = compile_dsl("ENTRY: CLOSE > 1 AND CLOSE > 2 OR CLOSE > 3 EXIT: 0 > 1").unwrap();
        assert_eq!(
            s.entry,
            Rule::or(Rule::and(close_gt(1.0), close_gt(2.0)), close_gt(3.0))
        );
    }

    #[test]
    fn parentheses_override_grouping() {
        let s = compile_dsl("ENTRY: CLOSE > 1 AND (CLOSE > 2 OR CLOSE > 3) EXIT: 0 > 1").unwrap();
        assert_eq!(
            s.entry,
            Rule::and(close_gt(1.0), Rule::or(close_gt(2.0), close_gt(3.0)))
        );
    }

    #[test]
    fn redundant_groups_collapse() {
        let s = compile_dsl("ENTRY: (((CLOSE > 1))) EXIT: 0 > 1").unwrap();
        assert_eq!(s.entry, close_gt(1.0));
    }

    #[test]
    fn indicator_call_typed() {
        let s = compile_dsl("ENTRY: CLOSE > SMA(CLOSE, 2) EXIT: CLOSE < SMA(CLOSE, 2)").unwrap();
        match s.entry {
            Rule::Comparison { right, .. } => assert_eq!(right, sma(2)),
            Rule::BinaryLogic { .. } => panic!("expected comparison"),
        }
    }

    #[test]
    fn unknown_indicator_rejected() {
        let err = compile_dsl("ENTRY: CLOSE > EMA(CLOSE, 5) EXIT: 0 > 1").unwrap_err();
        assert!(matches!(err, PhraseTraderError::UnknownIndicator { name } if name == "EMA"));
    }

    #[test]
    fn rsi_is_not_implemented() {
        let err = compile_dsl("ENTRY: RSI(CLOSE, 14) < 30 EXIT: 0 > 1").unwrap_err();
        assert!(matches!(err, PhraseTraderError::UnknownIndicator { name } if name == "RSI"));
    }

    #[test]
    fn unknown_indicator_in_exit_rule() {
        let err = compile_dsl("ENTRY: CLOSE > 1 EXIT: CLOSE < WMA(CLOSE, 3)").unwrap_err();
        assert!(matches!(err, PhraseTraderError::UnknownIndicator { .. }));
    }

    #[test]
    fn zero_period_rejected() {
        let err = compile_dsl("ENTRY: CLOSE > SMA(CLOSE, 0) EXIT: 0 > 1").unwrap_err();
        assert!(matches!(err, PhraseTraderError::MalformedAst { .. }));
    }

    #[test]
    fn fractional_period_rejected() {
        let err = compile_dsl("ENTRY: CLOSE > SMA(CLOSE, 2.5) EXIT: 0 > 1").unwrap_err();
        assert!(matches!(err, PhraseTraderError::MalformedAst { reason } if reason.contains("positive integer")));
    }

    #[test]
    fn negative_period_rejected() {
        assert!(compile_dsl("ENTRY: CLOSE > SMA(CLOSE, -3) EXIT: 0 > 1").is_err());
    }

    #[test]
    fn syntax_errors_pass_through() {
        let err = compile_dsl("ENTRY: CLOSE > 10").unwrap_err();
        assert!(matches!(err, PhraseTraderError::Syntax(_)));
    }

    #[test]
    fn classify_leaf_numeric_first() {
        assert_eq!(classify_leaf("42").unwrap(), Operand::Value(42.0));
        assert_eq!(classify_leaf("-1.5").unwrap(), Operand::Value(-1.5));
        assert_eq!(
            classify_leaf("VOLUME").unwrap(),
            Operand::Series(PriceField::Volume)
        );
        assert!(matches!(
            classify_leaf("VWAP"),
            Err(PhraseTraderError::MalformedAst { .. })
        ));
    }

    #[test]
    fn classify_leaf_rejects_non_finite() {
        assert!(classify_leaf("inf").is_err());
        assert!(classify_leaf("NaN").is_err());
    }

    #[test]
    fn display_round_trips() {
        let text = "ENTRY: (CLOSE > SMA(CLOSE, 20) OR OPEN <= 3.5) AND VOLUME >= 1000000 \
                    EXIT: CLOSE < SMA(HIGH, 5) OR (LOW == 2 AND HIGH != -1)";
        let s = compile_dsl(text).unwrap();
        let again = compile_dsl(&s.to_string()).unwrap();
        assert_eq!(s, again);
    }
}
