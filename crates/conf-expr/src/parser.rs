//! Recursive-descent parser for the `expr` language
//!
//! Precedence, lowest first: `or`, `and`, `not`, comparisons and `in`,
//! `+ -`, `* / // %`, unary `- +`, then postfix attribute, index and call.

use crate::ast::{BinaryOp, Expr, MAX_DEPTH, UnaryOp};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::{Error, Result};
use conf_model::Value;

/// Parse a complete expression.
pub fn parse(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(Error::syntax(trailing.pos, "unexpected trailing input"));
    }
    if expr.depth() > MAX_DEPTH {
        return Err(Error::syntax(0, "expression nested too deeply"));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open nesting levels plus operators in the chains being built
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(name) if name == keyword)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::syntax(self.peek().pos, "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(Error::syntax(self.peek().pos, format!("expected {}", what)))
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.or();
        self.depth -= 1;
        expr
    }

    fn or(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut lhs = self.and()?;
        while self.eat_keyword("or") {
            self.enter()?;
            let rhs = self.and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut lhs = self.not()?;
        while self.eat_keyword("and") {
            self.enter()?;
            let rhs = self.not()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr> {
        if self.eat_keyword("not") {
            self.enter()?;
            let operand = self.not()?;
            self.depth -= 1;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut lhs = self.additive()?;
        loop {
            let op = if self.eat_keyword("not") {
                if !self.is_keyword("in") {
                    return Err(Error::syntax(self.peek().pos, "expected 'in' after 'not'"));
                }
                BinaryOp::NotIn
            } else {
                match &self.peek().kind {
                    TokenKind::EqEq => BinaryOp::Eq,
                    TokenKind::NotEq => BinaryOp::NotEq,
                    TokenKind::Lt => BinaryOp::Lt,
                    TokenKind::Le => BinaryOp::Le,
                    TokenKind::Gt => BinaryOp::Gt,
                    TokenKind::Ge => BinaryOp::Ge,
                    TokenKind::Ident(name) if name == "in" => BinaryOp::In,
                    _ => break,
                }
            };
            self.advance();
            self.enter()?;
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::DoubleSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            self.enter()?;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        self.depth = base;
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary()?;
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            if matches!(
                self.peek().kind,
                TokenKind::Dot | TokenKind::LBracket | TokenKind::LParen
            ) {
                self.enter()?;
            }
            if self.eat(&TokenKind::Dot) {
                let token = self.advance();
                let TokenKind::Ident(name) = token.kind else {
                    return Err(Error::syntax(token.pos, "expected attribute name"));
                };
                expr = Expr::Attribute {
                    target: Box::new(expr),
                    name,
                };
            } else if self.eat(&TokenKind::LBracket) {
                let index = self.expression()?;
                self.expect(TokenKind::RBracket, "']'")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&TokenKind::LParen) {
                let args = self.sequence(TokenKind::RParen, "')'")?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else {
                self.depth = base;
                return Ok(expr);
            }
        }
    }

    /// Comma-separated expressions up to `close`, allowing a trailing comma.
    fn sequence(&mut self, close: TokenKind, what: &str) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.eat(&close) {
            items.push(self.expression()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(close, what)?;
                break;
            }
        }
        Ok(items)
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let expr = match token.kind {
            TokenKind::Int(i) => Expr::Literal(Value::Int(i)),
            TokenKind::Float(f) => Expr::Literal(Value::Float(f)),
            TokenKind::Str(s) => Expr::Literal(Value::Str(s)),
            TokenKind::Ref(reference) => Expr::Reference(reference),
            TokenKind::Ident(name) => match name.as_str() {
                "true" | "True" => Expr::Literal(Value::Bool(true)),
                "false" | "False" => Expr::Literal(Value::Bool(false)),
                "null" | "None" => Expr::Literal(Value::Null),
                "and" | "or" | "not" | "in" => {
                    return Err(Error::syntax(token.pos, format!("unexpected keyword '{}'", name)));
                }
                _ => Expr::Name(name),
            },
            TokenKind::LParen => {
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                inner
            }
            TokenKind::LBracket => Expr::List(self.sequence(TokenKind::RBracket, "']'")?),
            TokenKind::LBrace => self.map()?,
            TokenKind::Eof => return Err(Error::syntax(token.pos, "unexpected end of expression")),
            _ => return Err(Error::syntax(token.pos, "unexpected token")),
        };
        Ok(expr)
    }

    fn map(&mut self) -> Result<Expr> {
        let mut entries = Vec::new();
        while !self.eat(&TokenKind::RBrace) {
            let key = self.expression()?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.expression()?;
            entries.push((key, value));
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBrace, "'}'")?;
                break;
            }
        }
        Ok(Expr::Map(entries))
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
