use crate::error::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers: `parents` and helper-function names, distinguished in the parser
    Word(String),
    /// Quoted string literal, single or double quotes, escapes resolved
    Str(String),
    /// Numeric literal; formulas compute in IEEE-754 doubles
    Num(f64),
    // Punctuation
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    /// 1-based column in the formula text.
    pub col: u32,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, SchemaError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let tok_col = (pos + 1) as u32;

        // String literal, single or double quoted
        if c == '"' || c == '\'' {
            let quote = c;
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(SchemaError::lex(tok_col, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == quote {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(SchemaError::lex(tok_col, "unterminated escape in string"));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\'' => s.push('\''),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                col: tok_col,
            });
            continue;
        }

        // Number. '-' is never part of a literal here: infix and unary
        // minus are both the parser's job.
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            let s: String = chars[start..pos].iter().collect();
            let n: f64 = s
                .parse()
                .map_err(|_| SchemaError::lex(tok_col, format!("invalid number '{}'", s)))?;
            tokens.push(Spanned {
                token: Token::Num(n),
                col: tok_col,
            });
            continue;
        }

        // Operators and punctuation
        match c {
            '=' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Eq,
                        col: tok_col,
                    });
                    pos += 2;
                } else {
                    return Err(SchemaError::lex(
                        tok_col,
                        "unexpected '='; use '==' for comparison",
                    ));
                }
                continue;
            }
            '!' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Neq,
                        col: tok_col,
                    });
                    pos += 2;
                } else {
                    return Err(SchemaError::lex(tok_col, "unexpected character '!'"));
                }
                continue;
            }
            '<' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Lte,
                        col: tok_col,
                    });
                    pos += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Lt,
                        col: tok_col,
                    });
                    pos += 1;
                }
                continue;
            }
            '>' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Gte,
                        col: tok_col,
                    });
                    pos += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Gt,
                        col: tok_col,
                    });
                    pos += 1;
                }
                continue;
            }
            '+' => {
                tokens.push(Spanned {
                    token: Token::Plus,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '-' => {
                tokens.push(Spanned {
                    token: Token::Minus,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '*' => {
                tokens.push(Spanned {
                    token: Token::Star,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '/' => {
                tokens.push(Spanned {
                    token: Token::Slash,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '[' => {
                tokens.push(Spanned {
                    token: Token::LBracket,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            ']' => {
                tokens.push(Spanned {
                    token: Token::RBracket,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '(' => {
                tokens.push(Spanned {
                    token: Token::LParen,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            ')' => {
                tokens.push(Spanned {
                    token: Token::RParen,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            ',' => {
                tokens.push(Spanned {
                    token: Token::Comma,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            '?' => {
                tokens.push(Spanned {
                    token: Token::Question,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            ':' => {
                tokens.push(Spanned {
                    token: Token::Colon,
                    col: tok_col,
                });
                pos += 1;
                continue;
            }
            _ => {}
        }

        // Identifier
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                col: tok_col,
            });
            continue;
        }

        return Err(SchemaError::lex(
            tok_col,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        col: (chars.len() + 1) as u32,
    });
    Ok(tokens)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_parent_accessor() {
        assert_eq!(
            kinds("parents['DOB']"),
            vec![
                Token::Word("parents".into()),
                Token::LBracket,
                Token::Str("DOB".into()),
                Token::RBracket,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_arithmetic_and_numbers() {
        assert_eq!(
            kinds("1 + 2.5 * (3 - 4) / 5"),
            vec![
                Token::Num(1.0),
                Token::Plus,
                Token::Num(2.5),
                Token::Star,
                Token::LParen,
                Token::Num(3.0),
                Token::Minus,
                Token::Num(4.0),
                Token::RParen,
                Token::Slash,
                Token::Num(5.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn minus_is_an_operator_not_a_sign() {
        // "1-2" must be three tokens, not Num(1) Num(-2)
        assert_eq!(
            kinds("1-2"),
            vec![Token::Num(1.0), Token::Minus, Token::Num(2.0), Token::Eof]
        );
    }

    #[test]
    fn lexes_comparisons_and_conditional() {
        assert_eq!(
            kinds("a >= 18 ? 'x' : \"y\""),
            vec![
                Token::Word("a".into()),
                Token::Gte,
                Token::Num(18.0),
                Token::Question,
                Token::Str("x".into()),
                Token::Colon,
                Token::Str("y".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes_resolve() {
        assert_eq!(
            kinds(r#"'it\'s' + "a\"b""#),
            vec![
                Token::Str("it's".into()),
                Token::Plus,
                Token::Str("a\"b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error_with_column() {
        let err = lex("sum('abc").unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.column, Some(5));
    }

    #[test]
    fn single_equals_is_rejected() {
        let err = lex("parents['A'] = 3").unwrap_err();
        assert!(err.message.contains("'=='"), "got: {}", err.message);
    }

    #[test]
    fn unexpected_character_reports_column() {
        let err = lex("sum(1) # 2").unwrap_err();
        assert_eq!(err.column, Some(8));
    }
}
