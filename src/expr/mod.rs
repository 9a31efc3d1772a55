//! 表达式引擎：规则表达式的词法、语法与求值
pub mod ast;
pub mod lexer;
pub mod parser;

pub use self::ast::{CompareOp, ExprNode, Field, LogicOp};
pub use self::lexer::{tokenize, Lexer, Token, TokenKind};
pub use self::parser::Parser;

use crate::error::FpResult;

/// 编译完整表达式：词法 + 语法分析一步到位
pub fn compile(input: &str) -> FpResult<ExprNode> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse()
}
