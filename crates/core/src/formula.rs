//! Interpreter for admin-authored reward formulas: numbers, `+ - * /`, unary
//! minus, parentheses, `base`/`level`/`multiplier` and `rand(min,max)`.

use crate::{sample_range, FormulaError, RandomSource};
use std::fmt;

const RAND_KEYWORD: &str = "rand";
const MAX_DEPTH: usize = 64;
const MAX_TOKENS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bindings {
    pub base: f64,
    pub level: f64,
    pub multiplier: f64,
}

impl Bindings {
    pub fn new(base: f64, level: f64) -> Self {
        Self {
            base,
            level,
            multiplier: level * 0.5,
        }
    }

    fn lookup(&self, ident: &str) -> Option<f64> {
        match ident {
            "base" => Some(self.base),
            "level" => Some(self.level),
            "multiplier" => Some(self.multiplier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    pub fn eval(&self) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Unary {
                op: UnaryOp::Neg,
                expr,
            } => Ok(-expr.eval()?),
            Expr::Binary { left, op, right } => {
                let left = left.eval()?;
                let right = right.eval()?;
                match op {
                    BinaryOp::Add => Ok(left + right),
                    BinaryOp::Sub => Ok(left - right),
                    BinaryOp::Mul => Ok(left * right),
                    BinaryOp::Div => {
                        if right == 0.0 {
                            Err(FormulaError::DivisionByZero)
                        } else {
                            Ok(left / right)
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub expanded: String,
}

pub fn evaluate<R: RandomSource + ?Sized>(
    formula: &str,
    bindings: &Bindings,
    rng: &mut R,
) -> Result<Evaluation, FormulaError> {
    let expanded = expand_rand_calls(formula, |min, max| {
        sample_range(&mut *rng, min, max).map_err(|_| FormulaError::RandBounds { min, max })
    })?;
    let expr = parse_formula(&expanded, bindings)?;
    let value = expr.eval()?;
    if !value.is_finite() {
        return Err(FormulaError::NonFinite(value));
    }
    Ok(Evaluation { value, expanded })
}

/// Validates a formula without drawing any randomness. Runtime failures such
/// as division by a zero-valued binding are not detected here.
pub fn check_formula(formula: &str) -> Result<(), FormulaError> {
    let expanded = expand_rand_calls(formula, |min, max| {
        if min > max {
            Err(FormulaError::RandBounds { min, max })
        } else {
            Ok(min)
        }
    })?;
    parse_formula(&expanded, &Bindings::new(1.0, 1.0)).map(|_| ())
}

pub fn parse_formula(input: &str, bindings: &Bindings) -> Result<Expr, FormulaError> {
    let mut parser = FormulaParser::new(input, bindings)?;
    if parser.tokens.is_empty() {
        return Err(FormulaError::Empty);
    }
    let expr = parser.parse_expr()?;
    match parser.next_token() {
        None => Ok(expr),
        Some(token) => Err(FormulaError::UnexpectedToken(token.to_string())),
    }
}

// Negative draws are parenthesized so `x-rand(..)` stays well formed.
fn expand_rand_calls<F>(input: &str, mut draw: F) -> Result<String, FormulaError>
where
    F: FnMut(i64, i64) -> Result<i64, FormulaError>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find(RAND_KEYWORD) {
        let (head, tail) = rest.split_at(idx);
        let after = &tail[RAND_KEYWORD.len()..];
        let glued = head
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        out.push_str(head);
        if glued || !after.starts_with('(') {
            // Not a call; the tokenizer rejects the leftover identifier.
            out.push_str(RAND_KEYWORD);
            rest = after;
            continue;
        }
        let close = after
            .find(')')
            .ok_or_else(|| FormulaError::InvalidRand("missing ')'".to_string()))?;
        let (min, max) = parse_rand_args(&after[1..close])?;
        let value = draw(min, max)?;
        if value < 0 {
            out.push_str(&format!("({value})"));
        } else {
            out.push_str(&value.to_string());
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn parse_rand_args(args: &str) -> Result<(i64, i64), FormulaError> {
    let parts: Vec<&str> = args.split(',').collect();
    if parts.len() != 2 {
        return Err(FormulaError::InvalidRand(format!(
            "expected 2 arguments, got {}",
            parts.len()
        )));
    }
    Ok((parse_int_literal(parts[0])?, parse_int_literal(parts[1])?))
}

fn parse_int_literal(raw: &str) -> Result<i64, FormulaError> {
    let text = raw.trim();
    text.parse::<i64>().map_err(|_| {
        FormulaError::InvalidRand(format!("'{}' is not an integer literal", text))
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Ident(value) => write!(f, "'{value}'"),
            Token::Op(op) => write!(f, "'{op}'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
        }
    }
}

struct FormulaParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    bindings: &'a Bindings,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &str, bindings: &'a Bindings) -> Result<Self, FormulaError> {
        let tokens = tokenize(input)?;
        // Operator chains build a left-deep tree that eval and drop walk recursively.
        if tokens.len() > MAX_TOKENS {
            return Err(FormulaError::TooLong {
                tokens: tokens.len(),
                limit: MAX_TOKENS,
            });
        }
        Ok(Self {
            tokens,
            pos: 0,
            depth: 0,
            bindings,
        })
    }

    fn parse_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut node = self.parse_term()?;
        loop {
            let op = if self.match_op('+') {
                BinaryOp::Add
            } else if self.match_op('-') {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_term()?;
            node = Expr::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut node = self.parse_factor()?;
        loop {
            let op = if self.match_op('*') {
                BinaryOp::Mul
            } else if self.match_op('/') {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.parse_factor()?;
            node = Expr::Binary {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> Result<Expr, FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::UnexpectedToken(format!(
                "nesting deeper than {MAX_DEPTH}"
            )));
        }
        let result = if self.match_op('-') {
            self.parse_factor().map(|expr| Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            })
        } else {
            self.parse_primary()
        };
        self.depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> Result<Expr, FormulaError> {
        match self.next_token() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => {
                if name == RAND_KEYWORD {
                    return Err(FormulaError::InvalidRand(
                        "rand must be called as rand(min,max) with integer literals".to_string(),
                    ));
                }
                self.bindings
                    .lookup(&name)
                    .map(Expr::Number)
                    .ok_or(FormulaError::UnknownIdentifier(name))
            }
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                match self.next_token() {
                    Some(Token::RParen) => Ok(expr),
                    Some(other) => Err(FormulaError::UnexpectedToken(other.to_string())),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some(other) => Err(FormulaError::UnexpectedToken(other.to_string())),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn match_op(&mut self, op: char) -> bool {
        if let Some(Token::Op(value)) = self.peek_token() {
            if *value == op {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_token(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(tok)
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((offset, ch)) = chars.peek().copied() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch.is_ascii_digit() || ch == '.' {
            let mut value = String::new();
            while let Some((_, next)) = chars.peek().copied() {
                if !next.is_ascii_digit() && next != '.' {
                    break;
                }
                value.push(next);
                chars.next();
            }
            let number: f64 = value
                .parse()
                .map_err(|_| FormulaError::InvalidNumber(value.clone()))?;
            tokens.push(Token::Number(number));
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let mut ident = String::new();
            while let Some((_, next)) = chars.peek().copied() {
                if !next.is_ascii_alphanumeric() {
                    break;
                }
                ident.push(next);
                chars.next();
            }
            tokens.push(Token::Ident(ident));
            continue;
        }
        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '+' | '-' | '*' | '/' => Token::Op(ch),
            _ => return Err(FormulaError::InvalidChar { ch, offset }),
        };
        tokens.push(token);
        chars.next();
    }
    Ok(tokens)
}
