//! DSL grammar parser.
//!
//! Recursive descent over the token stream from [`dsl_lexer`], producing a
//! concrete parse tree that mirrors the grammar one node per production:
//!
//! ```text
//! strategy   := "ENTRY:" rule_set "EXIT:" rule_set
//! rule_set   := condition (LOGIC_OP condition)*
//! condition  := comparison | "(" rule_set ")"
//! comparison := expression OPERATOR expression
//! expression := FIELD | indicator | NUMBER
//! indicator  := INDICATOR_NAME "(" FIELD "," NUMBER ")"
//! ```
//!
//! The tree keeps the raw tokens; typing and folding happen in
//! [`ast_builder`](crate::domain::ast_builder). Errors carry the offending
//! token and its byte offset.
//!
//! Rules are bounded: parentheses nest at most [`MAX_NESTING`] deep and each
//! of the entry and exit rules holds at most [`MAX_COMPARISONS`] comparisons.
//!
//! [`dsl_lexer`]: crate::domain::dsl_lexer

use crate::domain::dsl_lexer::{tokenize, Token, TokenKind};
use crate::domain::error::ParseError;
use crate::domain::rule::MAX_COMPARISONS;

/// Deepest parenthesis nesting a rule may use.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyNode {
    pub entry: RuleSetNode,
    pub exit: RuleSetNode,
}

/// `condition (LOGIC_OP condition)*`, kept flat in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSetNode {
    pub first: ConditionNode,
    pub rest: Vec<(Token, ConditionNode)>,
}

/// Wrapper with exactly one semantic child.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Comparison(ComparisonNode),
    Group(Box<RuleSetNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonNode {
    pub left: ExpressionNode,
    pub op: Token,
    pub right: ExpressionNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// A FIELD or NUMBER token.
    Leaf(Token),
    Indicator {
        name: Token,
        field: Token,
        period: Token,
    },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    comparisons: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            comparisons: 0,
        }
    }

    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: String) -> ParseError {
        ParseError {
            message,
            token: token.describe(),
            position: token.position,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error_at(
                token,
                format!("expected {}, found '{}'", kind, token.describe()),
            ))
        }
    }

    fn parse_strategy(&mut self) -> Result<StrategyNode, ParseError> {
        self.expect(TokenKind::EntryLabel)?;
        let entry = self.parse_rule_set()?;
        self.expect(TokenKind::ExitLabel)?;
        self.comparisons = 0;
        let exit = self.parse_rule_set()?;

        let trailing = self.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(self.error_at(
                trailing,
                format!("unexpected input after exit rule: '{}'", trailing.describe()),
            ));
        }

        Ok(StrategyNode { entry, exit })
    }

    fn parse_rule_set(&mut self) -> Result<RuleSetNode, ParseError> {
        let first = self.parse_condition()?;
        let mut rest = Vec::new();
        while self.peek().kind == TokenKind::Logic {
            let op = self.advance();
            rest.push((op, self.parse_condition()?));
        }
        Ok(RuleSetNode { first, rest })
    }

    fn parse_condition(&mut self) -> Result<ConditionNode, ParseError> {
        if self.peek().kind == TokenKind::LParen {
            if self.depth == MAX_NESTING {
                let token = self.peek();
                return Err(self.error_at(
                    token,
                    format!("parentheses nested deeper than {}", MAX_NESTING),
                ));
            }
            self.advance();
            self.depth += 1;
            let inner = self.parse_rule_set()?;
            self.depth -= 1;
            self.expect(TokenKind::RParen)?;
            return Ok(ConditionNode::Group(Box::new(inner)));
        }
        Ok(ConditionNode::Comparison(self.parse_comparison()?))
    }

    fn parse_comparison(&mut self) -> Result<ComparisonNode, ParseError> {
        if self.comparisons == MAX_COMPARISONS {
            let token = self.peek();
            return Err(self.error_at(
                token,
                format!("rule has more than {} comparisons", MAX_COMPARISONS),
            ));
        }
        self.comparisons += 1;
        let left = self.parse_expression()?;
        let op = self.expect(TokenKind::Operator)?;
        let right = self.parse_expression()?;
        Ok(ComparisonNode { left, op, right })
    }

    fn parse_expression(&mut self) -> Result<ExpressionNode, ParseError> {
        match self.peek().kind {
            TokenKind::Field | TokenKind::Number => Ok(ExpressionNode::Leaf(self.advance())),
            TokenKind::IndicatorName => self.parse_indicator(),
            _ => {
                let token = self.peek();
                Err(self.error_at(
                    token,
                    format!(
                        "expected field, indicator or number, found '{}'",
                        token.describe()
                    ),
                ))
            }
        }
    }

    fn parse_indicator(&mut self) -> Result<ExpressionNode, ParseError> {
        let name = self.expect(TokenKind::IndicatorName)?;
        self.expect(TokenKind::LParen)?;
        let field = self.expect(TokenKind::Field)?;
        self.expect(TokenKind::Comma)?;
        let period = self.expect(TokenKind::Number)?;
        self.expect(TokenKind::RParen)?;
        Ok(ExpressionNode::Indicator {
            name,
            field,
            period,
        })
    }
}

/// Parse `ENTRY: ... EXIT: ...` text into a concrete parse tree.
pub fn parse(input: &str) -> Result<StrategyNode, ParseError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse_strategy()
}
