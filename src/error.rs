//! 全局错误类型定义

use thiserror::Error;
use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;

use crate::expr::lexer::TokenKind;

#[derive(Error, Debug)]
pub enum FingerprintError {
    // 词法相关错误
    #[error("词法错误：非法字符 '{ch}' (0x{code:02x}) 在位置 {pos}\n{context}")]
    IllegalChar {
        ch: char,
        code: u32,
        pos: usize,
        context: String,
    },
    #[error("词法错误：未终止的字符串文本，起始位置: {pos}\n{context}")]
    UnterminatedString { pos: usize, context: String },

    // 语法相关错误
    #[error("语法错误: 期望 {expected}, 但得到 {found} (位置: {pos})")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        pos: usize,
    },
    #[error("语法错误: 期望 = 或 !=, 但得到 {found} (位置: {pos})")]
    ExpectedOperator { found: TokenKind, pos: usize },
    #[error("无效字段名: '{name}' (位置: {pos})")]
    InvalidField { name: String, pos: usize },
    #[error("语法错误: 表达式尾部有多余内容 '{text}' (位置: {pos})")]
    TrailingContent { text: String, pos: usize },

    // 规则加载相关错误
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),

    // 序列化/反序列化错误
    #[error("YAML解析失败：{0}")]
    YamlError(#[from] SerdeYamlError),
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type FpResult<T> = Result<T, FingerprintError>;
