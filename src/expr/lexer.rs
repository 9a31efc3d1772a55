//! 表达式词法分析器
//! 将规则表达式字符串切分为带位置信息的 Token 序列，位置均为字节偏移

use std::fmt;

use crate::error::{FingerprintError, FpResult};

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Str,
    And,
    Or,
    Equals,
    NotEquals,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "标识符",
            TokenKind::Str => "字符串",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Equals => "'='",
            TokenKind::NotEquals => "'!='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eof => "表达式结尾",
        };
        f.write_str(name)
    }
}

/// 带位置信息的 Token
/// 字符串 Token 的 text 为转义处理后的内容，pos 指向起始引号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

/// 词法分析器，持有输入与当前扫描位置
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// 返回下一个 Token 并推进扫描位置
    /// 输入耗尽后返回 EOF Token，重复调用保持返回 EOF
    pub fn next_token(&mut self) -> FpResult<Token> {
        self.skip_whitespace();
        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", self.pos));
        };
        let start = self.pos;
        match ch {
            '=' => {
                // = 与 == 等价，均为 Equals
                self.pos += 1;
                if self.peek() == Some('=') {
                    self.pos += 1;
                    Ok(Token::new(TokenKind::Equals, "==", start))
                } else {
                    Ok(Token::new(TokenKind::Equals, "=", start))
                }
            }
            '!' => {
                if self.peek_at(1) == Some('=') {
                    self.pos += 2;
                    Ok(Token::new(TokenKind::NotEquals, "!=", start))
                } else {
                    Err(self.illegal(ch, start))
                }
            }
            '&' => {
                // 不存在单 & 操作符
                if self.peek_at(1) == Some('&') {
                    self.pos += 2;
                    Ok(Token::new(TokenKind::And, "&&", start))
                } else {
                    Err(self.illegal(ch, start))
                }
            }
            '|' => {
                if self.peek_at(1) == Some('|') {
                    self.pos += 2;
                    Ok(Token::new(TokenKind::Or, "||", start))
                } else {
                    Err(self.illegal(ch, start))
                }
            }
            '(' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::LParen, "(", start))
            }
            ')' => {
                self.pos += 1;
                Ok(Token::new(TokenKind::RParen, ")", start))
            }
            '"' => self.read_string(),
            c if c.is_alphabetic() => Ok(self.read_identifier()),
            other => Err(self.illegal(other, start)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// 标识符：字母开头，后续允许字母、数字、下划线及路径类符号
    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '<' | '>' | '/' | ':' | '.' | '-') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Identifier, &self.input[start..self.pos], start)
    }

    /// 双引号字符串：支持 \" 与 \\ 转义，其余反斜杠原样保留
    fn read_string(&mut self) -> FpResult<Token> {
        let start = self.pos;
        self.pos += 1; // 跳过起始引号
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.pos += 1; // 跳过结束引号
                    return Ok(Token::new(TokenKind::Str, text, start));
                }
                '\\' if matches!(self.peek_at(1), Some('"') | Some('\\')) => {
                    text.push(self.peek_at(1).unwrap_or('\\'));
                    self.pos += 2;
                }
                _ => {
                    text.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        // 到达输入末尾仍未闭合，错误位置指向起始引号
        Err(FingerprintError::UnterminatedString {
            pos: start,
            context: position_context(self.input, start),
        })
    }

    fn illegal(&self, ch: char, pos: usize) -> FingerprintError {
        FingerprintError::IllegalChar {
            ch,
            code: ch as u32,
            pos,
            context: position_context(self.input, pos),
        }
    }
}

/// 对输入做完整词法分析，末尾附带 EOF Token
pub fn tokenize(input: &str) -> FpResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            return Ok(tokens);
        }
    }
}

/// 渲染错误位置上下文：取错误位置前后各约 20 字节，第二行用 ^ 指向出错偏移
pub(crate) fn position_context(input: &str, pos: usize) -> String {
    if pos >= input.len() {
        return "end of input".to_string();
    }

    let mut start = pos.saturating_sub(20);
    while !input.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (pos + 20).min(input.len());
    while !input.is_char_boundary(end) {
        end += 1;
    }

    let context = &input[start..end];
    // 指针列按字符数计算，并补偿前缀的三个点
    let pointer_pad = 3 + input[start..pos].chars().count();
    format!("...{}...\n{}^", context, " ".repeat(pointer_pad))
}
