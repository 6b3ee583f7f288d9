//! Tokenizer for the `expr` language

use crate::reference::Reference;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Ref(Reference),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset in the source
    pub pos: usize,
}

/// Split `source` into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer { source, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn next_token(&mut self) -> Result<Token> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start,
            });
        };

        let kind = match c {
            '0'..='9' => self.number()?,
            '"' | '\'' => self.string(c)?,
            '@' => {
                let (reference, len) = Reference::match_at(self.rest())
                    .ok_or_else(|| Error::syntax(start, "invalid reference"))?;
                self.pos += len;
                TokenKind::Ref(reference)
            }
            c if c == '_' || c.is_alphabetic() => {
                while self
                    .peek()
                    .is_some_and(|c| c == '_' || c.is_alphanumeric())
                {
                    self.bump();
                }
                TokenKind::Ident(self.source[start..self.pos].to_string())
            }
            _ => self.punct(c)?,
        };

        Ok(Token { kind, pos: start })
    }

    fn punct(&mut self, c: char) -> Result<TokenKind> {
        let start = self.pos;
        let two = |lexer: &mut Self, next: char, double: TokenKind, single: TokenKind| {
            lexer.bump();
            if lexer.peek() == Some(next) {
                lexer.bump();
                double
            } else {
                single
            }
        };

        let kind = match c {
            '/' => two(self, '/', TokenKind::DoubleSlash, TokenKind::Slash),
            '<' => two(self, '=', TokenKind::Le, TokenKind::Lt),
            '>' => two(self, '=', TokenKind::Ge, TokenKind::Gt),
            '=' | '!' => {
                self.bump();
                if self.peek() != Some('=') {
                    return Err(Error::syntax(start, format!("unexpected character {:?}", c)));
                }
                self.bump();
                if c == '=' {
                    TokenKind::EqEq
                } else {
                    TokenKind::NotEq
                }
            }
            _ => {
                self.bump();
                match c {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' => TokenKind::Star,
                    '%' => TokenKind::Percent,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    '.' => TokenKind::Dot,
                    _ => {
                        return Err(Error::syntax(start, format!("unexpected character {:?}", c)));
                    }
                }
            }
        };
        Ok(kind)
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let mut is_float = false;
        self.digits();

        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut probe = self.rest().chars().skip(1);
            let next = probe.next();
            let exponent = match next {
                Some('+' | '-') => probe.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.digits();
            }
        }

        let text: String = self.source[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|e| Error::syntax(start, e.to_string()))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|e| Error::syntax(start, e.to_string()))
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(Error::syntax(start, "unterminated string"));
            };
            if c == quote {
                return Ok(TokenKind::Str(out));
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escape_pos = self.pos - 1;
            match self.bump() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some('u') => {
                    let hex: String = self.rest().chars().take(4).collect();
                    let code = (hex.len() == 4)
                        .then(|| u32::from_str_radix(&hex, 16).ok())
                        .flatten()
                        .and_then(char::from_u32)
                        .ok_or_else(|| Error::syntax(escape_pos, "invalid unicode escape"))?;
                    self.pos += 4;
                    out.push(code);
                }
                Some(c @ ('\\' | '"' | '\'')) => out.push(c),
                Some(c) => {
                    return Err(Error::syntax(escape_pos, format!("invalid escape \\{}", c)));
                }
                None => return Err(Error::syntax(start, "unterminated string")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_reference_arithmetic() {
        assert_eq!(
            kinds("@six * 2.0"),
            vec![
                TokenKind::Ref(Reference::parse("@six").unwrap()),
                TokenKind::Star,
                TokenKind::Float(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_followed_by_attribute_dot() {
        assert_eq!(
            kinds("1.x // 2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Dot,
                TokenKind::Ident("x".into()),
                TokenKind::DoubleSlash,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("1e3")[0], TokenKind::Float(1000.0));
        assert_eq!(kinds("1_000")[0], TokenKind::Int(1000));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "é\n""#),
            vec![
                TokenKind::Str("it's".into()),
                TokenKind::Str("é\n".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn errors_carry_offsets() {
        assert_eq!(
            tokenize("1 + 'abc").unwrap_err(),
            Error::syntax(4, "unterminated string")
        );
        assert!(matches!(
            tokenize("a = b").unwrap_err(),
            Error::Syntax { position: 2, .. }
        ));
        assert!(matches!(
            tokenize("@ x").unwrap_err(),
            Error::Syntax { position: 0, .. }
        ));
    }
}
