//! Recursive-descent parser for formula text.
//!
//! Produces the restricted [`Expr`] AST. No resolution happens here: the
//! parser only knows the fixed helper names and the `parents` accessor,
//! and anything else is a parse error, since there is nothing else a
//! formula could legally mean.

use crate::ast::Expr;
use crate::error::SchemaError;
use crate::lexer::{self, Spanned, Token};

mod expressions;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_col(&self) -> u32 {
        self.cur().col
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), SchemaError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {}, got {}", what, describe(self.peek()))))
        }
    }

    fn take_str(&mut self) -> Result<String, SchemaError> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.err(format!(
                "expected string literal, got {}",
                describe(self.peek())
            )))
        }
    }

    fn err(&self, msg: impl Into<String>) -> SchemaError {
        SchemaError::parse(self.cur_col(), msg)
    }
}

/// Human-readable token name for error messages.
fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{}'", w),
        Token::Str(s) => format!("string '{}'", s),
        Token::Num(n) => format!("number {}", n),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Question => "'?'".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Eq => "'=='".to_string(),
        Token::Neq => "'!='".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Lte => "'<='".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Gte => "'>='".to_string(),
        Token::Eof => "end of formula".to_string(),
    }
}

/// Parse a complete formula string into an expression tree.
///
/// The whole input must be one expression; trailing tokens are an error
/// (catches things like `a < b < c` and unbalanced parentheses).
pub fn parse_formula(src: &str) -> Result<Expr, SchemaError> {
    let tokens = lexer::lex(src)?;
    let mut p = Parser::new(&tokens);
    let expr = p.parse_expr()?;
    if p.peek() != &Token::Eof {
        return Err(p.err(format!(
            "expected end of formula, got {}",
            describe(p.peek())
        )));
    }
    Ok(expr)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
