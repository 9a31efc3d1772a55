//! 表达式语法分析器
//! 递归下降 + 显式优先级：|| 最低，&& 次之，括号最高
//!
//! ```text
//! Expression := Term (OR Term)*
//! Term       := Factor (AND Factor)*
//! Factor     := '(' Expression ')' | Condition
//! Condition  := Identifier (EQUALS | NOT-EQUALS) StringLiteral
//! ```

use super::ast::{CompareOp, ExprNode, Field, LogicOp};
use super::lexer::{Token, TokenKind};
use crate::error::{FingerprintError, FpResult};

/// 语法分析器，消费整个 Token 序列产出 AST
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> Token {
        self.tokens.get(self.pos).cloned().unwrap_or_else(|| Token {
            kind: TokenKind::Eof,
            text: String::new(),
            pos: self.tokens.last().map(|t| t.pos).unwrap_or(0),
        })
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: TokenKind) -> FpResult<Token> {
        let token = self.current();
        if token.kind == kind {
            self.advance();
            Ok(token)
        } else {
            Err(FingerprintError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                pos: token.pos,
            })
        }
    }

    /// 解析完整表达式；完整表达式之后若仍有 Token 则为尾部多余内容错误
    pub fn parse(mut self) -> FpResult<ExprNode> {
        let node = self.parse_expression()?;
        let trailing = self.current();
        if trailing.kind != TokenKind::Eof {
            return Err(FingerprintError::TrailingContent {
                text: trailing.text,
                pos: trailing.pos,
            });
        }
        Ok(node)
    }

    fn parse_expression(&mut self) -> FpResult<ExprNode> {
        let mut left = self.parse_term()?;
        while self.current().kind == TokenKind::Or {
            self.advance();
            let right = self.parse_term()?;
            left = ExprNode::Binary {
                op: LogicOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> FpResult<ExprNode> {
        let mut left = self.parse_factor()?;
        while self.current().kind == TokenKind::And {
            self.advance();
            let right = self.parse_factor()?;
            left = ExprNode::Binary {
                op: LogicOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> FpResult<ExprNode> {
        if self.current().kind == TokenKind::LParen {
            self.advance();
            let node = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            return Ok(node);
        }
        self.parse_condition()
    }

    fn parse_condition(&mut self) -> FpResult<ExprNode> {
        let ident = self.expect(TokenKind::Identifier)?;
        // 字段名在编译期即收紧到 body/header/hash
        let field =
            Field::from_ident(&ident.text).ok_or_else(|| FingerprintError::InvalidField {
                name: ident.text.clone(),
                pos: ident.pos,
            })?;

        let op_token = self.current();
        let op = match op_token.kind {
            TokenKind::Equals => CompareOp::Equals,
            TokenKind::NotEquals => CompareOp::NotEquals,
            found => {
                return Err(FingerprintError::ExpectedOperator {
                    found,
                    pos: op_token.pos,
                });
            }
        };
        self.advance();

        let literal = self.expect(TokenKind::Str)?;
        Ok(ExprNode::Condition {
            field,
            op,
            literal: literal.text,
        })
    }
}
