use super::{describe, Parser};
use crate::ast::{BinaryOp, Expr, HelperFn};
use crate::error::SchemaError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------
    //
    // Precedence, lowest to highest: conditional (?:), comparison,
    // additive, multiplicative, unary minus, atom.

    pub(super) fn parse_expr(&mut self) -> Result<Expr, SchemaError> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> Result<Expr, SchemaError> {
        let cond = self.parse_comparison()?;
        if self.peek() != &Token::Question {
            return Ok(cond);
        }
        self.advance();
        let then_branch = self.parse_conditional()?;
        self.expect(&Token::Colon, "':'")?;
        let else_branch = self.parse_conditional()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    // A single comparison, not a chain: `a < b < c` leaves the second `<`
    // unconsumed and parse_formula rejects the leftover.
    fn parse_comparison(&mut self) -> Result<Expr, SchemaError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Token::Eq => BinaryOp::Eq,
            Token::Neq => BinaryOp::Neq,
            Token::Lt => BinaryOp::Lt,
            Token::Lte => BinaryOp::Lte,
            Token::Gt => BinaryOp::Gt,
            Token::Gte => BinaryOp::Gte,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, SchemaError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SchemaError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SchemaError> {
        if self.peek() == &Token::Minus {
            self.advance();
            let e = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(e)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, SchemaError> {
        match self.peek().clone() {
            Token::Num(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(e)
            }
            Token::Word(w) if w == "parents" => {
                self.advance();
                self.expect(&Token::LBracket, "'[' after 'parents'")?;
                let label = self.take_str()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Expr::Parent(label))
            }
            Token::Word(w) => match HelperFn::from_name(&w) {
                Some(func) => {
                    self.advance();
                    let args = self.parse_call_args(func)?;
                    Ok(Expr::Call { func, args })
                }
                None => Err(self.err(format!(
                    "unknown function or identifier '{}'; formulas may only use \
                     parents['Label'] and the helper functions",
                    w
                ))),
            },
            other => Err(self.err(format!("expected expression, got {}", describe(&other)))),
        }
    }

    fn parse_call_args(&mut self, func: HelperFn) -> Result<Vec<Expr>, SchemaError> {
        self.expect(&Token::LParen, &format!("'(' after '{}'", func.name()))?;
        let mut args = Vec::new();
        if self.peek() == &Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or ')' in '{}' arguments, got {}",
                        func.name(),
                        describe(other)
                    )))
                }
            }
        }
    }
}
